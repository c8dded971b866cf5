// src/services/spreadsheet.rs

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};

use crate::{
    common::error::AppError,
    models::import::{ImportEntity, ImportRow},
};

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // whole numbers come back as floats; "25.0" would fail an integer parse
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Reads the first sheet of an `.xlsx`/`.xls` file. The first row holds the
/// column names; fully blank rows are skipped.
pub fn read_rows(bytes: Vec<u8>) -> Result<Vec<ImportRow>, AppError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| AppError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Spreadsheet("dosyada sayfa yok".into()))?
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let parsed = rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
        .map(|cells| {
            ImportRow::from_pairs(
                headers
                    .iter()
                    .zip(cells.iter())
                    .filter(|(header, _)| !header.is_empty())
                    .map(|(header, cell)| (header.as_str(), cell.as_str())),
            )
        })
        .collect();

    Ok(parsed)
}

/// A workbook with the entity's header row and one filled-in example row.
pub fn template(entity: ImportEntity) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(entity.sheet_name()).map_err(anyhow::Error::from)?;

    for (col, (name, example)) in entity.columns().iter().zip(entity.example_row()).enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *name, &header_format)
            .map_err(anyhow::Error::from)?;
        worksheet.write_string(1, col, *example).map_err(anyhow::Error::from)?;
        worksheet.set_column_width(col, 22).map_err(anyhow::Error::from)?;
    }

    Ok(workbook.save_to_buffer().map_err(anyhow::Error::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_reads_back_as_one_example_row() {
        for entity in [ImportEntity::Products, ImportEntity::Categories, ImportEntity::Brands, ImportEntity::Variants] {
            let bytes = template(entity).unwrap();
            let rows = read_rows(bytes).unwrap();

            assert_eq!(rows.len(), 1, "{entity}");
            let row = &rows[0];
            for (column, example) in entity.columns().iter().zip(entity.example_row()) {
                assert_eq!(row.text(column).as_deref(), Some(*example), "{entity}.{column}");
            }
        }
    }

    #[test]
    fn whole_floats_lose_their_fraction() {
        assert_eq!(cell_text(&Data::Float(25.0)), "25");
        assert_eq!(cell_text(&Data::Float(1499.9)), "1499.9");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn garbage_is_a_spreadsheet_error() {
        let err = read_rows(b"definitely not a workbook".to_vec()).unwrap_err();
        assert!(matches!(err, AppError::Spreadsheet(_)));
    }
}
