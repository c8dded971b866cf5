// src/services/import_service.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{BrandRepository, CategoryRepository, ProductRepository, VariationRepository},
    models::{
        brand::{CreateBrandPayload, UpdateBrandPayload},
        category::{CreateCategoryPayload, UpdateCategoryPayload},
        import::{
            BrandImportRow, CategoryImportRow, ImportEntity, ImportResult, ImportRow, ProductImportRow,
            VariantImportRow,
        },
        product::{CreateProductPayload, CreateVariationPayload, UpdateProductPayload, UpdateVariationPayload},
    },
    services::{
        brand_service::BrandService, category_service::CategoryService, product_service::ProductService,
        spreadsheet, variation_service::VariationService,
    },
};

/// The catalog operations an import needs. Lookups are by name (SKU for
/// variants) and return ids.
#[async_trait]
pub trait ImportStore: Send + Sync {
    async fn find_category(&self, name: &str) -> Result<Option<Uuid>, AppError>;
    async fn create_category(&self, payload: &CreateCategoryPayload) -> Result<Uuid, AppError>;
    async fn update_category(&self, id: Uuid, payload: &UpdateCategoryPayload) -> Result<(), AppError>;

    async fn find_brand(&self, name: &str) -> Result<Option<Uuid>, AppError>;
    async fn create_brand(&self, payload: &CreateBrandPayload) -> Result<Uuid, AppError>;
    async fn update_brand(&self, id: Uuid, payload: &UpdateBrandPayload) -> Result<(), AppError>;

    async fn find_product(&self, name: &str) -> Result<Option<Uuid>, AppError>;
    async fn create_product(&self, payload: &CreateProductPayload) -> Result<Uuid, AppError>;
    async fn update_product(&self, id: Uuid, payload: &UpdateProductPayload) -> Result<(), AppError>;

    async fn find_variation(&self, sku: &str) -> Result<Option<Uuid>, AppError>;
    async fn create_variation(&self, product_id: Uuid, payload: &CreateVariationPayload) -> Result<Uuid, AppError>;
    async fn update_variation(&self, id: Uuid, payload: &UpdateVariationPayload) -> Result<(), AppError>;
}

/// Import store backed by the catalog services, so imported rows go
/// through the same rules as the admin API.
#[derive(Clone)]
pub struct CatalogImportStore {
    pool: PgPool,
    category_repo: CategoryRepository,
    brand_repo: BrandRepository,
    product_repo: ProductRepository,
    variation_repo: VariationRepository,
    category_service: CategoryService,
    brand_service: BrandService,
    product_service: ProductService,
    variation_service: VariationService,
}

impl CatalogImportStore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        category_repo: CategoryRepository,
        brand_repo: BrandRepository,
        product_repo: ProductRepository,
        variation_repo: VariationRepository,
        category_service: CategoryService,
        brand_service: BrandService,
        product_service: ProductService,
        variation_service: VariationService,
    ) -> Self {
        Self {
            pool,
            category_repo,
            brand_repo,
            product_repo,
            variation_repo,
            category_service,
            brand_service,
            product_service,
            variation_service,
        }
    }
}

#[async_trait]
impl ImportStore for CatalogImportStore {
    async fn find_category(&self, name: &str) -> Result<Option<Uuid>, AppError> {
        Ok(self.category_repo.find_by_name(&self.pool, name).await?.map(|c| c.id))
    }

    async fn create_category(&self, payload: &CreateCategoryPayload) -> Result<Uuid, AppError> {
        Ok(self.category_service.create(payload).await?.id)
    }

    async fn update_category(&self, id: Uuid, payload: &UpdateCategoryPayload) -> Result<(), AppError> {
        self.category_service.update(id, payload).await.map(|_| ())
    }

    async fn find_brand(&self, name: &str) -> Result<Option<Uuid>, AppError> {
        Ok(self.brand_repo.find_by_name(&self.pool, name).await?.map(|b| b.id))
    }

    async fn create_brand(&self, payload: &CreateBrandPayload) -> Result<Uuid, AppError> {
        Ok(self.brand_service.create(payload).await?.id)
    }

    async fn update_brand(&self, id: Uuid, payload: &UpdateBrandPayload) -> Result<(), AppError> {
        self.brand_service.update(id, payload).await.map(|_| ())
    }

    async fn find_product(&self, name: &str) -> Result<Option<Uuid>, AppError> {
        Ok(self.product_repo.find_by_name(&self.pool, name).await?.map(|p| p.id))
    }

    async fn create_product(&self, payload: &CreateProductPayload) -> Result<Uuid, AppError> {
        Ok(self.product_service.create(payload).await?.product.id)
    }

    async fn update_product(&self, id: Uuid, payload: &UpdateProductPayload) -> Result<(), AppError> {
        self.product_service.update(id, payload).await.map(|_| ())
    }

    async fn find_variation(&self, sku: &str) -> Result<Option<Uuid>, AppError> {
        Ok(self.variation_repo.find_by_sku(&self.pool, sku).await?.map(|v| v.id))
    }

    async fn create_variation(&self, product_id: Uuid, payload: &CreateVariationPayload) -> Result<Uuid, AppError> {
        Ok(self.variation_service.create(product_id, payload).await?.variation.id)
    }

    async fn update_variation(&self, id: Uuid, payload: &UpdateVariationPayload) -> Result<(), AppError> {
        self.variation_service.update(id, payload).await.map(|_| ())
    }
}

fn describe(err: AppError) -> String {
    err.messages().join(", ")
}

/// Imported payloads obey the same field rules as the admin API.
fn validated<T: Validate>(payload: T) -> Result<T, String> {
    payload.validate().map_err(|e| describe(e.into()))?;
    Ok(payload)
}

#[derive(Clone)]
pub struct ImportService<S> {
    store: S,
}

impl<S: ImportStore> ImportService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn import_file(&self, entity: ImportEntity, bytes: Vec<u8>) -> Result<ImportResult, AppError> {
        let rows = spreadsheet::read_rows(bytes)?;
        Ok(self.import(entity, &rows).await)
    }

    /// Processes every row on its own. A failing row is recorded as
    /// "Satır N: ..." (N counts the header as row 1) and the loop moves on.
    pub async fn import(&self, entity: ImportEntity, rows: &[ImportRow]) -> ImportResult {
        let mut result = ImportResult { total_processed: rows.len(), ..Default::default() };

        for (index, row) in rows.iter().enumerate() {
            let outcome = match entity {
                ImportEntity::Categories => self.import_category(row).await,
                ImportEntity::Brands => self.import_brand(row).await,
                ImportEntity::Products => self.import_product(row).await,
                ImportEntity::Variants => self.import_variant(row).await,
            };

            match outcome {
                Ok(()) => result.success_count += 1,
                Err(message) => {
                    result.error_count += 1;
                    result.errors.push(format!("Satır {}: {}", index + 2, message));
                }
            }
        }

        tracing::info!(
            %entity,
            total = result.total_processed,
            success = result.success_count,
            errors = result.error_count,
            "import finished"
        );
        result
    }

    async fn resolve_category(&self, name: &str, create: bool) -> Result<Uuid, String> {
        if let Some(id) = self.store.find_category(name).await.map_err(describe)? {
            return Ok(id);
        }
        if !create {
            return Err(format!("Kategori bulunamadı: {}", name));
        }
        self.store
            .create_category(&CreateCategoryPayload {
                name: name.to_string(),
                slug: None,
                description: None,
                parent_id: None,
            })
            .await
            .map_err(describe)
    }

    async fn resolve_brand(&self, name: &str, create: bool) -> Result<Uuid, String> {
        if let Some(id) = self.store.find_brand(name).await.map_err(describe)? {
            return Ok(id);
        }
        if !create {
            return Err(format!("Marka bulunamadı: {}", name));
        }
        self.store
            .create_brand(&CreateBrandPayload { name: name.to_string(), slug: None, description: None, logo: None })
            .await
            .map_err(describe)
    }

    async fn import_category(&self, row: &ImportRow) -> Result<(), String> {
        let row = CategoryImportRow::try_from(row)?;

        let parent_id = match &row.parent_name {
            Some(parent) => Some(self.resolve_category(parent, row.create_parent_if_not_exists).await?),
            None => None,
        };

        let existing = self.store.find_category(&row.name).await.map_err(describe)?;
        match existing {
            Some(_) if !row.update_if_exists => Err(format!("Kategori zaten mevcut: {}", row.name)),
            Some(id) => self
                .store
                .update_category(
                    id,
                    &UpdateCategoryPayload {
                        name: None,
                        slug: row.slug,
                        description: row.description,
                        parent_id: parent_id.map(Some),
                    },
                )
                .await
                .map_err(describe),
            None => self
                .store
                .create_category(&CreateCategoryPayload {
                    name: row.name,
                    slug: row.slug,
                    description: row.description,
                    parent_id,
                })
                .await
                .map(|_| ())
                .map_err(describe),
        }
    }

    async fn import_brand(&self, row: &ImportRow) -> Result<(), String> {
        let row = BrandImportRow::try_from(row)?;

        let existing = self.store.find_brand(&row.name).await.map_err(describe)?;
        match existing {
            Some(_) if !row.update_if_exists => Err(format!("Marka zaten mevcut: {}", row.name)),
            Some(id) => self
                .store
                .update_brand(
                    id,
                    &UpdateBrandPayload { name: None, slug: row.slug, description: row.description, logo: row.logo },
                )
                .await
                .map_err(describe),
            None => self
                .store
                .create_brand(&CreateBrandPayload {
                    name: row.name,
                    slug: row.slug,
                    description: row.description,
                    logo: row.logo,
                })
                .await
                .map(|_| ())
                .map_err(describe),
        }
    }

    async fn import_product(&self, row: &ImportRow) -> Result<(), String> {
        let row = ProductImportRow::try_from(row)?;

        let category_id = self
            .resolve_category(&row.category_name, row.create_category_if_not_exists)
            .await?;
        let brand_id = self.resolve_brand(&row.brand_name, row.create_brand_if_not_exists).await?;

        let existing = self.store.find_product(&row.name).await.map_err(describe)?;
        match existing {
            Some(_) if !row.update_if_exists => Err(format!("Ürün zaten mevcut: {}", row.name)),
            Some(id) => self
                .store
                .update_product(
                    id,
                    &validated(UpdateProductPayload {
                        slug: row.slug,
                        description: row.description,
                        price: Some(row.price),
                        stock: row.stock,
                        featured: Some(row.featured),
                        category_id: Some(category_id),
                        brand_id: Some(brand_id),
                        seo_title: row.seo_title,
                        seo_description: row.seo_description,
                        ..Default::default()
                    })?,
                )
                .await
                .map_err(describe),
            None => self
                .store
                .create_product(&validated(CreateProductPayload {
                    name: row.name,
                    slug: row.slug,
                    description: row.description,
                    price: Some(row.price),
                    stock: row.stock,
                    featured: row.featured,
                    category_id: Some(category_id),
                    brand_id: Some(brand_id),
                    seo_title: row.seo_title,
                    seo_description: row.seo_description,
                    ..Default::default()
                })?)
                .await
                .map(|_| ())
                .map_err(describe),
        }
    }

    async fn import_variant(&self, row: &ImportRow) -> Result<(), String> {
        let row = VariantImportRow::try_from(row)?;

        let product_id = self
            .store
            .find_product(&row.product_name)
            .await
            .map_err(describe)?
            .ok_or_else(|| format!("Ürün bulunamadı: {}", row.product_name))?;

        let existing = self.store.find_variation(&row.sku).await.map_err(describe)?;
        match existing {
            Some(_) if !row.update_if_exists => Err(format!("Bu SKU zaten kullanılıyor: {}", row.sku)),
            Some(id) => self
                .store
                .update_variation(
                    id,
                    &validated(UpdateVariationPayload {
                        name: row.name,
                        price: row.price,
                        stock: row.stock,
                        ..Default::default()
                    })?,
                )
                .await
                .map_err(describe),
            None => self
                .store
                .create_variation(
                    product_id,
                    &validated(CreateVariationPayload {
                        name: row.name.unwrap_or_else(|| row.sku.clone()),
                        sku: Some(row.sku),
                        price: row.price,
                        stock: row.stock.unwrap_or(0),
                        options: Vec::new(),
                    })?,
                )
                .await
                .map(|_| ())
                .map_err(describe),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Entry {
        id: Uuid,
        name: String,
        parent_id: Option<Uuid>,
    }

    /// Keeps every entity kind as a flat list of named entries.
    #[derive(Default)]
    struct MemoryStore {
        categories: Mutex<Vec<Entry>>,
        brands: Mutex<Vec<Entry>>,
        products: Mutex<Vec<Entry>>,
        variations: Mutex<Vec<Entry>>,
    }

    fn find(list: &Mutex<Vec<Entry>>, name: &str) -> Option<Uuid> {
        list.lock()
            .unwrap()
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.id)
    }

    fn push(list: &Mutex<Vec<Entry>>, name: &str, parent_id: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        list.lock().unwrap().push(Entry { id, name: name.to_string(), parent_id });
        id
    }

    #[async_trait]
    impl ImportStore for MemoryStore {
        async fn find_category(&self, name: &str) -> Result<Option<Uuid>, AppError> {
            Ok(find(&self.categories, name))
        }
        async fn create_category(&self, payload: &CreateCategoryPayload) -> Result<Uuid, AppError> {
            Ok(push(&self.categories, &payload.name, payload.parent_id))
        }
        async fn update_category(&self, id: Uuid, payload: &UpdateCategoryPayload) -> Result<(), AppError> {
            let mut categories = self.categories.lock().unwrap();
            let entry = categories.iter_mut().find(|e| e.id == id).ok_or(AppError::NotFound("Kategori".into()))?;
            if let Some(parent) = payload.parent_id {
                entry.parent_id = parent;
            }
            Ok(())
        }
        async fn find_brand(&self, name: &str) -> Result<Option<Uuid>, AppError> {
            Ok(find(&self.brands, name))
        }
        async fn create_brand(&self, payload: &CreateBrandPayload) -> Result<Uuid, AppError> {
            Ok(push(&self.brands, &payload.name, None))
        }
        async fn update_brand(&self, _id: Uuid, _payload: &UpdateBrandPayload) -> Result<(), AppError> {
            Ok(())
        }
        async fn find_product(&self, name: &str) -> Result<Option<Uuid>, AppError> {
            Ok(find(&self.products, name))
        }
        async fn create_product(&self, payload: &CreateProductPayload) -> Result<Uuid, AppError> {
            Ok(push(&self.products, &payload.name, None))
        }
        async fn update_product(&self, _id: Uuid, _payload: &UpdateProductPayload) -> Result<(), AppError> {
            Ok(())
        }
        async fn find_variation(&self, sku: &str) -> Result<Option<Uuid>, AppError> {
            Ok(find(&self.variations, sku))
        }
        async fn create_variation(&self, product_id: Uuid, payload: &CreateVariationPayload) -> Result<Uuid, AppError> {
            let sku = payload.sku.clone().unwrap_or_default();
            Ok(push(&self.variations, &sku, Some(product_id)))
        }
        async fn update_variation(&self, _id: Uuid, _payload: &UpdateVariationPayload) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn row(pairs: &[(&str, &str)]) -> ImportRow {
        ImportRow::from_pairs(pairs.iter().copied())
    }

    #[tokio::test]
    async fn failing_row_is_collected_and_the_rest_continue() {
        let service = ImportService::new(MemoryStore::default());
        let names: Vec<String> = (1..=10).map(|i| format!("Marka {}", i)).collect();
        let rows: Vec<ImportRow> = names
            .iter()
            .enumerate()
            .map(|(i, name)| if i == 4 { row(&[("description", "adı yok")]) } else { row(&[("name", name.as_str())]) })
            .collect();

        let result = service.import(ImportEntity::Brands, &rows).await;

        assert_eq!(result.total_processed, 10);
        assert_eq!(result.success_count, 9);
        assert_eq!(result.error_count, 1);
        assert!(result.errors[0].contains("Satır 6"), "{:?}", result.errors);
        assert!(result.errors[0].contains("'name'"));
        assert_eq!(service.store.brands.lock().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn missing_parent_category_is_created_first() {
        let service = ImportService::new(MemoryStore::default());
        let rows = vec![row(&[
            ("name", "Elektronik"),
            ("parentName", "Ana Kategori"),
            ("createParentIfNotExists", "true"),
        ])];

        let result = service.import(ImportEntity::Categories, &rows).await;

        assert_eq!(result.success_count, 1);
        assert_eq!(result.error_count, 0);

        let categories = service.store.categories.lock().unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Ana Kategori");
        assert_eq!(categories[0].parent_id, None);
        assert_eq!(categories[1].name, "Elektronik");
        assert_eq!(categories[1].parent_id, Some(categories[0].id));
    }

    #[tokio::test]
    async fn missing_parent_without_flag_fails_the_row() {
        let service = ImportService::new(MemoryStore::default());
        let rows = vec![row(&[("name", "Elektronik"), ("parentName", "Ana Kategori")])];

        let result = service.import(ImportEntity::Categories, &rows).await;

        assert_eq!(result.error_count, 1);
        assert!(result.errors[0].starts_with("Satır 2: "));
        assert!(result.errors[0].contains("Ana Kategori"));
        assert!(service.store.categories.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_entity_needs_update_flag() {
        let service = ImportService::new(MemoryStore::default());
        push(&service.store.brands, "Anker", None);

        let rows = vec![row(&[("name", "Anker")]), row(&[("name", "anker"), ("updateIfExists", "evet")])];
        let result = service.import(ImportEntity::Brands, &rows).await;

        assert_eq!(result.success_count, 1);
        assert_eq!(result.error_count, 1);
        assert!(result.errors[0].starts_with("Satır 2: "));
    }

    #[tokio::test]
    async fn products_auto_create_references_when_asked() {
        let service = ImportService::new(MemoryStore::default());
        let rows = vec![
            row(&[
                ("name", "Kulaklık"),
                ("price", "1499,90"),
                ("categoryName", "Elektronik"),
                ("brandName", "Anker"),
                ("createCategoryIfNotExists", "1"),
                ("createBrandIfNotExists", "x"),
            ]),
            row(&[("name", "Hoparlör"), ("price", "999"), ("categoryName", "Ses"), ("brandName", "Anker")]),
        ];

        let result = service.import(ImportEntity::Products, &rows).await;

        assert_eq!(result.success_count, 1);
        assert!(result.errors[0].contains("Satır 3"));
        assert!(result.errors[0].contains("Ses"));
        assert_eq!(service.store.categories.lock().unwrap().len(), 1);
        assert_eq!(service.store.brands.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn variants_need_an_existing_product() {
        let service = ImportService::new(MemoryStore::default());
        let product_id = push(&service.store.products, "Kulaklık", None);

        let rows = vec![
            row(&[("productName", "Kulaklık"), ("sku", "KLK-SIYAH"), ("stock", "4")]),
            row(&[("productName", "Yok"), ("sku", "YOK-1")]),
        ];
        let result = service.import(ImportEntity::Variants, &rows).await;

        assert_eq!(result.success_count, 1);
        assert!(result.errors[0].contains("Ürün bulunamadı: Yok"));

        let variations = service.store.variations.lock().unwrap();
        assert_eq!(variations.len(), 1);
        assert_eq!(variations[0].parent_id, Some(product_id));
    }

    #[tokio::test]
    async fn negative_variant_price_is_rejected_before_the_store() {
        let service = ImportService::new(MemoryStore::default());
        push(&service.store.products, "Kulaklık", None);

        let rows = vec![row(&[("productName", "Kulaklık"), ("sku", "KLK-1"), ("price", "-50")])];
        let result = service.import(ImportEntity::Variants, &rows).await;

        assert_eq!(result.error_count, 1);
        assert!(result.errors[0].starts_with("Satır 2: "));
        assert!(result.errors[0].contains("negatif"));
        assert!(service.store.variations.lock().unwrap().is_empty());
    }

    #[test]
    fn built_payloads_are_validated() {
        let bad = UpdateVariationPayload { price: Some(rust_decimal::Decimal::new(-1, 0)), ..Default::default() };
        assert!(validated(bad).is_err());

        let good = UpdateVariationPayload { stock: Some(3), ..Default::default() };
        assert_eq!(validated(good).unwrap().stock, Some(3));
    }

}
