// src/services/variation_service.rs

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, VariationRepository},
    models::product::{
        CreateVariationPayload, OptionType, UpdateVariationPayload, Variation, VariationOption,
        VariationOptionInput, VariationOptionValue, VariationWithOptions,
    },
};

/// Fails when `sku` already belongs to a variation other than `current_id`.
pub fn ensure_sku_available(sku: &str, existing: Option<&Variation>, current_id: Option<Uuid>) -> Result<(), AppError> {
    match existing {
        Some(v) if Some(v.id) != current_id => Err(AppError::validation(format!("Bu SKU zaten kullanılıyor: {}", sku))),
        _ => Ok(()),
    }
}

/// Every requested option must exist and be of the declared type.
pub fn check_option_consistency(requested: &[VariationOptionInput], found: &[VariationOption]) -> Result<(), AppError> {
    let by_id: HashMap<Uuid, &VariationOption> = found.iter().map(|o| (o.id, o)).collect();
    let mut errors = Vec::new();

    for input in requested {
        match by_id.get(&input.variation_option_id) {
            None => errors.push(format!("Varyasyon seçeneği bulunamadı: {}", input.variation_option_id)),
            Some(option) if option.option_type_id != input.option_type_id => errors.push(format!(
                "Seçenek {} bildirilen {} tipine ait değil (gerçek tip: {})",
                input.variation_option_id, input.option_type_id, option.option_type_id
            )),
            Some(_) => {}
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(AppError::Validation(errors)) }
}

/// Trims the SKU and treats blank as absent.
fn normalize_sku(sku: Option<&str>) -> Option<&str> {
    sku.map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn attach_options(variations: Vec<Variation>, options: Vec<VariationOptionValue>) -> Vec<VariationWithOptions> {
    let mut by_variation: HashMap<Uuid, Vec<VariationOptionValue>> = HashMap::new();
    for option in options {
        by_variation.entry(option.variation_id).or_default().push(option);
    }
    variations
        .into_iter()
        .map(|variation| {
            let options = by_variation.remove(&variation.id).unwrap_or_default();
            VariationWithOptions { variation, options }
        })
        .collect()
}

#[derive(Clone)]
pub struct VariationService {
    pool: PgPool,
    variation_repo: VariationRepository,
    product_repo: ProductRepository,
}

impl VariationService {
    pub fn new(pool: PgPool, variation_repo: VariationRepository, product_repo: ProductRepository) -> Self {
        Self { pool, variation_repo, product_repo }
    }

    pub async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<VariationWithOptions>, AppError> {
        let mut conn = self.pool.acquire().await?;

        self.product_repo
            .find_by_id(&mut *conn, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ürün".into()))?;

        let variations = self.variation_repo.list_for_products(&mut *conn, &[product_id]).await?;
        let ids: Vec<Uuid> = variations.iter().map(|v| v.id).collect();
        let options = self.variation_repo.options_for(&mut *conn, &ids).await?;

        Ok(attach_options(variations, options))
    }

    pub async fn get(&self, id: Uuid) -> Result<VariationWithOptions, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.load(&mut conn, id).await
    }

    async fn load(&self, conn: &mut PgConnection, id: Uuid) -> Result<VariationWithOptions, AppError> {
        let variation = self
            .variation_repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Varyasyon".into()))?;
        let options = self.variation_repo.options_for(&mut *conn, &[id]).await?;
        Ok(VariationWithOptions { variation, options })
    }

    pub async fn find_by_sku(&self, sku: &str) -> Result<Option<Variation>, AppError> {
        self.variation_repo.find_by_sku(&self.pool, sku).await
    }

    pub async fn create(&self, product_id: Uuid, payload: &CreateVariationPayload) -> Result<VariationWithOptions, AppError> {
        let mut tx = self.pool.begin().await?;

        self.product_repo
            .find_by_id(&mut *tx, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ürün".into()))?;

        let variation = self.create_in(&mut tx, product_id, payload, false).await?;
        let result = self.load(&mut tx, variation.id).await?;

        tx.commit().await?;
        tracing::info!(variation_id = %variation.id, %product_id, "variation created");
        Ok(result)
    }

    /// Inserts a variation and its option links on an open transaction.
    pub(crate) async fn create_in(
        &self,
        conn: &mut PgConnection,
        product_id: Uuid,
        payload: &CreateVariationPayload,
        is_default: bool,
    ) -> Result<Variation, AppError> {
        let sku = normalize_sku(payload.sku.as_deref());
        if let Some(sku) = sku {
            let existing = self.variation_repo.find_by_sku(&mut *conn, sku).await?;
            ensure_sku_available(sku, existing.as_ref(), None)?;
        }

        self.validate_options(conn, &payload.options).await?;

        let variation = self
            .variation_repo
            .create(&mut *conn, product_id, payload.name.trim(), sku, payload.price, payload.stock, is_default)
            .await?;

        for option in &payload.options {
            self.variation_repo
                .link_option(&mut *conn, variation.id, option.variation_option_id, option.option_type_id)
                .await?;
        }

        Ok(variation)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateVariationPayload) -> Result<VariationWithOptions, AppError> {
        let mut tx = self.pool.begin().await?;

        self.variation_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Varyasyon".into()))?;

        let sku = normalize_sku(payload.sku.as_deref());
        if let Some(sku) = sku {
            let existing = self.variation_repo.find_by_sku(&mut *tx, sku).await?;
            ensure_sku_available(sku, existing.as_ref(), Some(id))?;
        }

        self.variation_repo
            .update(&mut *tx, id, payload.name.as_deref().map(str::trim), sku, payload.price, payload.stock)
            .await?;

        // Options are replaced wholesale, no diffing.
        if let Some(options) = &payload.options {
            self.validate_options(&mut tx, options).await?;
            self.variation_repo.unlink_options(&mut *tx, id).await?;
            for option in options {
                self.variation_repo
                    .link_option(&mut *tx, id, option.variation_option_id, option.option_type_id)
                    .await?;
            }
        }

        let result = self.load(&mut tx, id).await?;
        tx.commit().await?;
        Ok(result)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.variation_repo.unlink_options(&mut *tx, id).await?;
        let deleted = self.variation_repo.delete(&mut *tx, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Varyasyon".into()));
        }

        tx.commit().await?;
        tracing::info!(variation_id = %id, "variation deleted");
        Ok(())
    }

    async fn validate_options(&self, conn: &mut PgConnection, options: &[VariationOptionInput]) -> Result<(), AppError> {
        if options.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = options.iter().map(|o| o.variation_option_id).collect();
        let found = self.variation_repo.find_option_values(&mut *conn, &ids).await?;
        check_option_consistency(options, &found)
    }

    // --- OPTION CATALOG ---

    pub async fn list_option_types(&self) -> Result<Vec<OptionType>, AppError> {
        self.variation_repo.list_option_types(&self.pool).await
    }

    pub async fn create_option_type(&self, name: &str) -> Result<OptionType, AppError> {
        self.variation_repo.create_option_type(&self.pool, name.trim()).await
    }

    pub async fn list_option_values(&self, option_type_id: Uuid) -> Result<Vec<VariationOption>, AppError> {
        self.ensure_option_type(option_type_id).await?;
        self.variation_repo.list_option_values(&self.pool, option_type_id).await
    }

    pub async fn create_option_value(&self, option_type_id: Uuid, value: &str) -> Result<VariationOption, AppError> {
        self.ensure_option_type(option_type_id).await?;
        self.variation_repo
            .create_option_value(&self.pool, option_type_id, value.trim())
            .await
    }

    async fn ensure_option_type(&self, id: Uuid) -> Result<OptionType, AppError> {
        self.variation_repo
            .find_option_type(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Seçenek tipi".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::fixtures;
    use crate::services::test_support;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn option(option_type_id: Uuid) -> VariationOption {
        VariationOption {
            id: Uuid::new_v4(),
            option_type_id,
            value: "Kırmızı".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sku_taken_by_another_variation_names_the_sku() {
        let mut existing = fixtures::variation(Uuid::new_v4(), 1, None);
        existing.sku = Some("ABC-001".into());

        let err = ensure_sku_available("abc-001", Some(&existing), None).unwrap_err();
        assert!(err.messages()[0].contains("abc-001"));
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn sku_kept_by_the_same_variation_is_fine() {
        let existing = fixtures::variation(Uuid::new_v4(), 1, None);
        assert!(ensure_sku_available("ABC", Some(&existing), Some(existing.id)).is_ok());
        assert!(ensure_sku_available("ABC", None, None).is_ok());
    }

    #[test]
    fn mismatched_option_type_names_both_ids() {
        let color = Uuid::new_v4();
        let size = Uuid::new_v4();
        let red = option(color);

        let requested = [VariationOptionInput { option_type_id: size, variation_option_id: red.id }];
        let err = check_option_consistency(&requested, &[red.clone()]).unwrap_err();
        let message = &err.messages()[0];
        assert!(message.contains(&red.id.to_string()));
        assert!(message.contains(&size.to_string()));
    }

    #[test]
    fn missing_and_valid_options() {
        let color = Uuid::new_v4();
        let red = option(color);
        let ghost = Uuid::new_v4();

        let ok = [VariationOptionInput { option_type_id: color, variation_option_id: red.id }];
        assert!(check_option_consistency(&ok, &[red.clone()]).is_ok());

        let missing = [VariationOptionInput { option_type_id: color, variation_option_id: ghost }];
        let err = check_option_consistency(&missing, &[red]).unwrap_err();
        assert!(err.messages()[0].contains(&ghost.to_string()));
    }

    #[test]
    fn blank_sku_is_absent() {
        assert_eq!(normalize_sku(Some("  ")), None);
        assert_eq!(normalize_sku(Some(" ABC ")), Some("ABC"));
        assert_eq!(normalize_sku(None), None);
    }

    #[test]
    fn options_are_grouped_per_variation() {
        let product_id = Uuid::new_v4();
        let a = fixtures::variation(product_id, 1, None);
        let b = fixtures::variation(product_id, 1, None);
        let value = VariationOptionValue {
            variation_id: b.id,
            variation_option_id: Uuid::new_v4(),
            option_type_id: Uuid::new_v4(),
            option_type_name: "Renk".into(),
            value: "Mavi".into(),
        };

        let grouped = attach_options(vec![a, b], vec![value]);
        assert!(grouped[0].options.is_empty());
        assert_eq!(grouped[1].options[0].value, "Mavi");
    }

    fn with_sku(sku: &str) -> CreateVariationPayload {
        CreateVariationPayload { name: format!("Model {sku}"), sku: Some(sku.into()), price: None, stock: 1, options: vec![] }
    }

    #[sqlx::test]
    async fn sku_is_unique_regardless_of_case(pool: PgPool) {
        let state = test_support::state(pool);
        let product_id = test_support::seed_product(&state, "Kulaklık", Decimal::new(500, 0), &[]).await.product.id;
        let variations = &state.variation_service;

        variations.create(product_id, &with_sku("KLK-001")).await.unwrap();
        let err = variations.create(product_id, &with_sku("klk-001")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let other = variations.create(product_id, &with_sku("KLK-002")).await.unwrap();
        let taken = UpdateVariationPayload { sku: Some("Klk-001".into()), ..Default::default() };
        assert!(matches!(variations.update(other.variation.id, &taken).await, Err(AppError::Validation(_))));

        let own = UpdateVariationPayload { sku: Some("klk-002".into()), ..Default::default() };
        let updated = variations.update(other.variation.id, &own).await.unwrap();
        assert_eq!(updated.variation.sku.as_deref(), Some("klk-002"));
    }

    #[sqlx::test]
    async fn sku_index_rejects_case_variants_written_directly(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let product_id = test_support::seed_product(&state, "Hoparlör", Decimal::new(750, 0), &[]).await.product.id;
        state.variation_service.create(product_id, &with_sku("HOP-9")).await.unwrap();

        let insert = sqlx::query("INSERT INTO variations (id, product_id, name, sku, stock) VALUES ($1, $2, 'Kopya', 'hop-9', 0)")
            .bind(Uuid::new_v4())
            .bind(product_id)
            .execute(&pool)
            .await;
        assert!(insert.is_err());
    }
}
