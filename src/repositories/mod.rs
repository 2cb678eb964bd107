pub mod order_repository;
pub mod product_repository;
pub mod purchase_repository;
pub mod raise_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use order_repository::OrderRepository;
pub use product_repository::ProductRepository;
pub use purchase_repository::PurchaseRepository;
pub use raise_repository::RaiseRepository;
pub use user_repository::UserRepository;
