pub mod auth;
pub mod brand;
pub mod category;
pub mod import;
pub mod order;
pub mod product;
