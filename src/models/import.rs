// src/models/import.rs

use std::{collections::HashMap, fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportEntity {
    Products,
    Categories,
    Brands,
    Variants,
}

impl ImportEntity {
    /// Column headers in template order. Required columns come first.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            ImportEntity::Categories => &[
                "name",
                "slug",
                "description",
                "parentName",
                "createParentIfNotExists",
                "updateIfExists",
            ],
            ImportEntity::Brands => &["name", "slug", "description", "logo", "updateIfExists"],
            ImportEntity::Products => &[
                "name",
                "price",
                "categoryName",
                "brandName",
                "slug",
                "description",
                "stock",
                "featured",
                "seoTitle",
                "seoDescription",
                "createCategoryIfNotExists",
                "createBrandIfNotExists",
                "updateIfExists",
            ],
            ImportEntity::Variants => &["productName", "sku", "name", "price", "stock", "updateIfExists"],
        }
    }

    /// One filled-in example row for the downloadable template.
    pub fn example_row(self) -> &'static [&'static str] {
        match self {
            ImportEntity::Categories => &["Elektronik", "elektronik", "Elektronik ürünler", "Ana Kategori", "true", "false"],
            ImportEntity::Brands => &["Anker", "anker", "Şarj ve ses ürünleri", "https://cdn.example.com/anker.png", "false"],
            ImportEntity::Products => &[
                "Kablosuz Kulaklık",
                "1499.90",
                "Elektronik",
                "Anker",
                "kablosuz-kulaklik",
                "Gürültü engelleyici kulaklık",
                "25",
                "false",
                "Kablosuz Kulaklık",
                "Anker kablosuz kulaklık",
                "true",
                "true",
                "false",
            ],
            ImportEntity::Variants => &["Kablosuz Kulaklık", "KLK-SIYAH", "Siyah", "1499.90", "10", "false"],
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            ImportEntity::Products => "Ürünler",
            ImportEntity::Categories => "Kategoriler",
            ImportEntity::Brands => "Markalar",
            ImportEntity::Variants => "Varyantlar",
        }
    }
}

impl fmt::Display for ImportEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImportEntity::Products => "products",
            ImportEntity::Categories => "categories",
            ImportEntity::Brands => "brands",
            ImportEntity::Variants => "variants",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total_processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

/// One spreadsheet row keyed by header. Blank cells are left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRow(pub HashMap<String, String>);

impl ImportRow {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        ImportRow(
            pairs
                .into_iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .map(|(k, v)| (k.to_string(), v.trim().to_string()))
                .collect(),
        )
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.0.get(column).cloned()
    }

    pub fn required(&self, column: &str) -> Result<String, String> {
        self.text(column)
            .ok_or_else(|| format!("'{}' alanı zorunludur", column))
    }

    pub fn flag(&self, column: &str) -> bool {
        self.0
            .get(column)
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "evet" | "x"))
            .unwrap_or(false)
    }

    pub fn parse<T: FromStr>(&self, column: &str) -> Result<Option<T>, String> {
        match self.0.get(column) {
            None => Ok(None),
            Some(raw) => {
                // spreadsheets in Turkish locale write decimals with a comma
                let normalized = raw.replace(',', ".");
                normalized
                    .parse::<T>()
                    .map(Some)
                    .map_err(|_| format!("'{}' alanı geçersiz: {}", column, raw))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryImportRow {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub parent_name: Option<String>,
    pub create_parent_if_not_exists: bool,
    pub update_if_exists: bool,
}

impl TryFrom<&ImportRow> for CategoryImportRow {
    type Error = String;

    fn try_from(row: &ImportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            name: row.required("name")?,
            slug: row.text("slug"),
            description: row.text("description"),
            parent_name: row.text("parentName"),
            create_parent_if_not_exists: row.flag("createParentIfNotExists"),
            update_if_exists: row.flag("updateIfExists"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandImportRow {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub update_if_exists: bool,
}

impl TryFrom<&ImportRow> for BrandImportRow {
    type Error = String;

    fn try_from(row: &ImportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            name: row.required("name")?,
            slug: row.text("slug"),
            description: row.text("description"),
            logo: row.text("logo"),
            update_if_exists: row.flag("updateIfExists"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductImportRow {
    pub name: String,
    pub price: Decimal,
    pub category_name: String,
    pub brand_name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub featured: bool,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub create_category_if_not_exists: bool,
    pub create_brand_if_not_exists: bool,
    pub update_if_exists: bool,
}

impl TryFrom<&ImportRow> for ProductImportRow {
    type Error = String;

    fn try_from(row: &ImportRow) -> Result<Self, Self::Error> {
        let name = row.required("name")?;
        let price: Decimal = row
            .parse("price")?
            .ok_or_else(|| "'price' alanı zorunludur".to_string())?;
        if price.is_sign_negative() {
            return Err("'price' negatif olamaz".into());
        }
        let stock: Option<i32> = row.parse("stock")?;
        if stock.is_some_and(|s| s < 0) {
            return Err("'stock' negatif olamaz".into());
        }

        Ok(Self {
            name,
            price,
            category_name: row.required("categoryName")?,
            brand_name: row.required("brandName")?,
            slug: row.text("slug"),
            description: row.text("description"),
            stock,
            featured: row.flag("featured"),
            seo_title: row.text("seoTitle"),
            seo_description: row.text("seoDescription"),
            create_category_if_not_exists: row.flag("createCategoryIfNotExists"),
            create_brand_if_not_exists: row.flag("createBrandIfNotExists"),
            update_if_exists: row.flag("updateIfExists"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantImportRow {
    pub product_name: String,
    pub sku: String,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub update_if_exists: bool,
}

impl TryFrom<&ImportRow> for VariantImportRow {
    type Error = String;

    fn try_from(row: &ImportRow) -> Result<Self, Self::Error> {
        let price: Option<Decimal> = row.parse("price")?;
        if price.is_some_and(|p| p.is_sign_negative()) {
            return Err("'price' negatif olamaz".into());
        }
        let stock: Option<i32> = row.parse("stock")?;
        if stock.is_some_and(|s| s < 0) {
            return Err("'stock' negatif olamaz".into());
        }
        Ok(Self {
            product_name: row.required("productName")?,
            sku: row.required("sku")?,
            name: row.text("name"),
            price,
            stock,
            update_if_exists: row.flag("updateIfExists"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cells_are_absent() {
        let row = ImportRow::from_pairs([("name", "Elektronik"), ("slug", "   ")]);
        assert_eq!(row.text("name").as_deref(), Some("Elektronik"));
        assert_eq!(row.text("slug"), None);
    }

    #[test]
    fn flags_accept_common_spellings() {
        let row = ImportRow::from_pairs([("a", "TRUE"), ("b", "Evet"), ("c", "1"), ("d", "hayır")]);
        assert!(row.flag("a"));
        assert!(row.flag("b"));
        assert!(row.flag("c"));
        assert!(!row.flag("d"));
        assert!(!row.flag("missing"));
    }

    #[test]
    fn product_row_requires_price_and_references() {
        let row = ImportRow::from_pairs([("name", "Kulaklık"), ("categoryName", "Elektronik"), ("brandName", "Anker")]);
        let err = ProductImportRow::try_from(&row).unwrap_err();
        assert!(err.contains("price"));

        let row = ImportRow::from_pairs([
            ("name", "Kulaklık"),
            ("price", "1499,90"),
            ("categoryName", "Elektronik"),
            ("brandName", "Anker"),
            ("stock", "5"),
        ]);
        let parsed = ProductImportRow::try_from(&row).unwrap();
        assert_eq!(parsed.price, Decimal::new(149990, 2));
        assert_eq!(parsed.stock, Some(5));
    }

    #[test]
    fn invalid_numbers_name_the_column() {
        let row = ImportRow::from_pairs([("productName", "Kulaklık"), ("sku", "A"), ("stock", "on")]);
        let err = VariantImportRow::try_from(&row).unwrap_err();
        assert!(err.contains("'stock'"));
    }

    #[test]
    fn template_rows_match_columns() {
        for entity in [ImportEntity::Products, ImportEntity::Categories, ImportEntity::Brands, ImportEntity::Variants] {
            assert_eq!(entity.columns().len(), entity.example_row().len(), "{entity}");
        }
    }

    #[test]
    fn variant_price_cannot_be_negative() {
        let negative = ImportRow::from_pairs([("productName", "Kulaklık"), ("sku", "A"), ("price", "-50")]);
        assert_eq!(VariantImportRow::try_from(&negative).unwrap_err(), "'price' negatif olamaz");

        let free = ImportRow::from_pairs([("productName", "Kulaklık"), ("sku", "A"), ("price", "0")]);
        assert_eq!(VariantImportRow::try_from(&free).unwrap().price, Some(Decimal::ZERO));
    }

}
