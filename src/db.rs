pub mod user_repo;
pub use user_repo::UserRepository;
pub mod category_repo;
pub use category_repo::CategoryRepository;
pub mod brand_repo;
pub use brand_repo::BrandRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod variation_repo;
pub use variation_repo::VariationRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod seller_repo;
pub use seller_repo::SellerRepository;
