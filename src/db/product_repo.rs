// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::{map_fk_violation, map_unique_violation, AppError},
    models::product::{Product, ProductFilter, ProductImage, ProductSort},
};

/// Column values for an insert. Slug is already resolved.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub price: Decimal,
    pub stock: i32,
    pub featured: bool,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub seo_title: Option<&'a str>,
    pub seo_description: Option<&'a str>,
    pub seo_keywords: Option<&'a str>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub url: String,
    pub alt: Option<String>,
}

const STOCK_EXPR: &str =
    "COALESCE((SELECT SUM(v.stock) FROM variations v WHERE v.product_id = p.id), p.stock)";

/// `%term%` with the LIKE wildcards in `term` taken literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Appends the `WHERE` clause for a listing filter. The builder must already
/// hold `... FROM products p` with no `WHERE`.
pub fn push_product_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(" AND p.name ILIKE ")
            .push_bind(contains_pattern(search))
            .push(" ESCAPE '\\'");
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(brand_id) = filter.brand_id {
        qb.push(" AND p.brand_id = ").push_bind(brand_id);
    }
    if let Some(featured) = filter.featured {
        qb.push(" AND p.featured = ").push_bind(featured);
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND p.price <= ").push_bind(max);
    }
    match filter.in_stock {
        Some(true) => {
            qb.push(format!(" AND {} > 0", STOCK_EXPR));
        }
        Some(false) => {
            qb.push(format!(" AND {} <= 0", STOCK_EXPR));
        }
        None => {}
    }
}

fn order_clause(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Newest => " ORDER BY p.created_at DESC, p.id",
        ProductSort::PriceAsc => " ORDER BY p.price ASC, p.id",
        ProductSort::PriceDesc => " ORDER BY p.price DESC, p.id",
        ProductSort::Name => " ORDER BY p.name ASC, p.id",
    }
}

#[derive(Clone, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT p.* FROM products p");
        push_product_filter(&mut qb, filter);
        qb.push(order_clause(filter.sort.unwrap_or_default()));
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let products = qb.build_query_as::<Product>().fetch_all(executor).await?;
        Ok(products)
    }

    pub async fn count<'e, E>(&self, executor: E, filter: &ProductFilter) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p");
        push_product_filter(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(total)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn find_by_slug<'e, E>(&self, executor: E, slug: &str) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn find_by_name<'e, E>(&self, executor: E, name: &str) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE LOWER(name) = LOWER($1) ORDER BY created_at LIMIT 1",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewProduct<'_>) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, slug, description, price, stock, featured,
                category_id, brand_id, seo_title, seo_description, seo_keywords
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(new.name)
        .bind(new.slug)
        .bind(new.description)
        .bind(new.price)
        .bind(new.stock)
        .bind(new.featured)
        .bind(new.category_id)
        .bind(new.brand_id)
        .bind(new.seo_title)
        .bind(new.seo_description)
        .bind(new.seo_keywords)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Bu slug zaten kullanılıyor: {}", new.slug)))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, patch: &ProductPatch) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name            = COALESCE($2, name),
                slug            = COALESCE($3, slug),
                description     = COALESCE($4, description),
                price           = COALESCE($5, price),
                stock           = COALESCE($6, stock),
                featured        = COALESCE($7, featured),
                category_id     = COALESCE($8, category_id),
                brand_id        = COALESCE($9, brand_id),
                seo_title       = COALESCE($10, seo_title),
                seo_description = COALESCE($11, seo_description),
                seo_keywords    = COALESCE($12, seo_keywords),
                updated_at      = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.slug)
        .bind(&patch.description)
        .bind(patch.price)
        .bind(patch.stock)
        .bind(patch.featured)
        .bind(patch.category_id)
        .bind(patch.brand_id)
        .bind(&patch.seo_title)
        .bind(&patch.seo_description)
        .bind(&patch.seo_keywords)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                format!("Bu slug zaten kullanılıyor: {}", patch.slug.as_deref().unwrap_or_default())
            })
        })?
        .ok_or_else(|| AppError::NotFound("Ürün".into()))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_fk_violation(e, || "Ürün siparişlerde kullanıldığı için silinemez".into()))?;
        Ok(result.rows_affected())
    }

    // ---
    // Images
    // ---

    pub async fn add_image<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        image: &NewImage,
        position: i32,
    ) -> Result<ProductImage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let image = sqlx::query_as::<_, ProductImage>(
            r#"
            INSERT INTO product_images (product_id, url, alt, position)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(&image.url)
        .bind(&image.alt)
        .bind(position)
        .fetch_one(executor)
        .await?;
        Ok(image)
    }

    pub async fn images_for<'e, E>(&self, executor: E, product_ids: &[Uuid]) -> Result<Vec<ProductImage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let images = sqlx::query_as::<_, ProductImage>(
            "SELECT * FROM product_images WHERE product_id = ANY($1) ORDER BY position ASC",
        )
        .bind(product_ids)
        .fetch_all(executor)
        .await?;
        Ok(images)
    }

    pub async fn delete_images<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_seller_links<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM product_sellers WHERE product_id = $1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_in_category<'e, E>(&self, executor: E, category_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn count_for_brand<'e, E>(&self, executor: E, brand_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE brand_id = $1")
            .bind(brand_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filter: &ProductFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT p.* FROM products p");
        push_product_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let sql = sql_for(&ProductFilter::default());
        assert_eq!(sql, "SELECT p.* FROM products p WHERE 1 = 1");
    }

    #[test]
    fn each_field_binds_in_order() {
        let filter = ProductFilter {
            search: Some("kulaklık".into()),
            category_id: Some(Uuid::new_v4()),
            brand_id: Some(Uuid::new_v4()),
            featured: Some(true),
            min_price: Some(Decimal::new(100, 0)),
            max_price: Some(Decimal::new(500, 0)),
            ..Default::default()
        };
        let sql = sql_for(&filter);

        assert!(sql.contains("p.name ILIKE $1"));
        assert!(sql.contains("p.category_id = $2"));
        assert!(sql.contains("p.brand_id = $3"));
        assert!(sql.contains("p.featured = $4"));
        assert!(sql.contains("p.price >= $5"));
        assert!(sql.contains("p.price <= $6"));
    }

    #[test]
    fn search_wildcards_are_matched_literally() {
        assert_eq!(contains_pattern("kulaklık"), "%kulaklık%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");

        let filter = ProductFilter {
            search: Some("100%".into()),
            ..Default::default()
        };
        assert!(sql_for(&filter).contains("p.name ILIKE $1 ESCAPE '\\'"));
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = ProductFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert!(!sql_for(&filter).contains("ILIKE"));
    }

    #[test]
    fn in_stock_uses_derived_stock() {
        let filter = ProductFilter {
            in_stock: Some(true),
            ..Default::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("SUM(v.stock)"));
        assert!(sql.ends_with("> 0"));
    }
}
