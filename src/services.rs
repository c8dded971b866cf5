pub mod auth;
pub mod brand_service;
pub mod category_service;
pub mod import_service;
pub mod order_service;
pub mod product_service;
pub mod spreadsheet;
pub mod user_service;
pub mod variation_service;

#[cfg(test)]
pub(crate) mod test_support;
