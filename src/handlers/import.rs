// src/handlers/import.rs

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{RequireRole, RoleAdmin},
    models::import::{ImportEntity, ImportResult},
    services::spreadsheet,
};

const ACCEPTED_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];

fn is_spreadsheet(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Pulls the `file` field out of the form.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Form okunamadı: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !is_spreadsheet(&file_name) {
            return Err(AppError::validation("Yalnızca .xlsx veya .xls dosyaları yüklenebilir."));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Dosya okunamadı: {}", e)))?;
        return Ok(bytes.to_vec());
    }

    Err(AppError::validation("Dosya yüklenmedi."))
}

#[utoipa::path(
    post,
    path = "/api/admin/import/{entity}",
    tag = "Import",
    params(("entity" = ImportEntity, Path, description = "products | categories | brands | variants")),
    request_body(content_type = "multipart/form-data", description = "`file` alanında .xlsx/.xls dosyası"),
    responses(
        (status = 200, description = "Satır bazında içe aktarma sonucu", body = ImportResult),
        (status = 400, description = "Dosya okunamadı"),
        (status = 403, description = "Yalnızca ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_entities(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(entity): Path<ImportEntity>,
    multipart: Multipart,
) -> Result<ApiResponse<ImportResult>, AppError> {
    let bytes = read_upload(multipart).await?;

    let result = app_state.import_service.import_file(entity, bytes).await?;
    let message = format!(
        "{} satır içe aktarıldı, {} satır hatalı",
        result.success_count, result.error_count
    );
    Ok(ApiResponse::with_message(result, message))
}

#[utoipa::path(
    get,
    path = "/api/admin/import/{entity}/template",
    tag = "Import",
    params(("entity" = ImportEntity, Path, description = "products | categories | brands | variants")),
    responses((
        status = 200,
        description = "Başlık satırı ve örnek satır içeren şablon",
        content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    )),
    security(("api_jwt" = []))
)]
pub async fn download_template(Path(entity): Path<ImportEntity>) -> Result<Response, AppError> {
    let bytes = spreadsheet::template(entity)?;
    let disposition = format!("attachment; filename=\"{}-template.xlsx\"", entity);

    Ok((
        [
            (header::CONTENT_TYPE, spreadsheet::XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_excel_uploads_are_accepted() {
        assert!(is_spreadsheet("urunler.xlsx"));
        assert!(is_spreadsheet("MARKALAR.XLS"));
        assert!(!is_spreadsheet("urunler.csv"));
        assert!(!is_spreadsheet(""));
    }

    #[tokio::test]
    async fn template_download_sets_attachment_headers() {
        let response = download_template(Path(ImportEntity::Brands)).await.unwrap();

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], spreadsheet::XLSX_CONTENT_TYPE);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"brands-template.xlsx\""
        );
    }
}
