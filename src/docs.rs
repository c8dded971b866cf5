// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Storefront ---
        handlers::site::get_site_info,
        handlers::products::list_public_products,
        handlers::products::get_product_by_slug,
        handlers::orders::checkout,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::my_orders,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Variations ---
        handlers::products::list_variations,
        handlers::products::create_variation,
        handlers::products::get_variation,
        handlers::products::update_variation,
        handlers::products::delete_variation,
        handlers::products::list_option_types,
        handlers::products::create_option_type,
        handlers::products::list_option_values,
        handlers::products::create_option_value,

        // --- Categories & brands ---
        handlers::catalog::list_categories,
        handlers::catalog::category_tree,
        handlers::catalog::get_category_by_slug,
        handlers::catalog::get_category,
        handlers::catalog::create_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::catalog::list_brands,
        handlers::catalog::get_brand,
        handlers::catalog::create_brand,
        handlers::catalog::update_brand,
        handlers::catalog::delete_brand,

        // --- Orders ---
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::orders::update_order_shipping,
        handlers::orders::upsert_order_payment,

        // --- Users & sellers ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::users::list_sellers,
        handlers::users::list_product_sellers,
        handlers::users::get_product_seller,
        handlers::users::create_product_seller,
        handlers::users::update_product_seller,
        handlers::users::delete_product_seller,

        // --- Import ---
        handlers::import::import_entities,
        handlers::import::download_template,
    ),
    components(
        schemas(
            handlers::site::SiteInfo,

            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Sellers ---
            models::auth::SellerSummary,
            models::auth::ProductSeller,
            models::auth::CreateProductSellerPayload,
            models::auth::UpdateProductSellerPayload,

            // --- Catalog ---
            models::product::Product,
            models::product::ProductImage,
            models::product::Variation,
            models::product::OptionType,
            models::product::VariationOption,
            models::product::VariationOptionValue,
            models::product::VariationWithOptions,
            models::product::ProductListItem,
            models::product::ProductDetail,
            models::product::ProductSort,
            models::product::ImagePayload,
            models::product::VariationOptionInput,
            models::product::CreateVariationPayload,
            models::product::UpdateVariationPayload,
            models::product::CreateProductPayload,
            models::product::UpdateProductPayload,
            models::product::CreateOptionTypePayload,
            models::product::CreateOptionValuePayload,
            models::category::Category,
            models::category::CategoryNode,
            models::category::CreateCategoryPayload,
            models::category::UpdateCategoryPayload,
            models::brand::Brand,
            models::brand::CreateBrandPayload,
            models::brand::UpdateBrandPayload,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::Order,
            models::order::OrderItem,
            models::order::Payment,
            models::order::OrderDetail,
            models::order::CheckoutItem,
            models::order::CheckoutPayload,
            models::order::UpdateOrderStatusPayload,
            models::order::UpdateShippingPayload,
            models::order::PaymentPayload,

            // --- Import ---
            models::import::ImportEntity,
            models::import::ImportResult,
        )
    ),
    tags(
        (name = "Storefront", description = "Mağaza vitrini (herkese açık)"),
        (name = "Auth", description = "Kayıt, giriş ve oturum"),
        (name = "Products", description = "Ürün yönetimi"),
        (name = "Variations", description = "Varyasyonlar ve seçenekler"),
        (name = "Categories", description = "Kategori ağacı"),
        (name = "Brands", description = "Markalar"),
        (name = "Orders", description = "Sipariş yaşam döngüsü"),
        (name = "Users", description = "Kullanıcı yönetimi (ADMIN)"),
        (name = "Sellers", description = "Ürün satan müşteriler"),
        (name = "Import", description = "Excel ile toplu içe aktarma")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_admin_and_storefront_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/orders"));
        assert!(paths.contains_key("/api/admin/products/{id}"));
        assert!(paths.contains_key("/api/admin/import/{entity}/template"));
        assert!(doc.components.unwrap().security_schemes.contains_key("api_jwt"));
    }
}
