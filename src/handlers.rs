pub mod auth;
pub mod catalog;
pub mod import;
pub mod orders;
pub mod products;
pub mod site;
pub mod users;
