pub mod audit;
pub mod order_service;
pub mod popularity_sweeper;
pub mod purchase_service;
pub mod raise_service;
pub mod user_service;

pub use audit::AuditTrailService;
pub use order_service::OrderService;
pub use popularity_sweeper::PopularitySweeper;
pub use purchase_service::PurchaseService;
pub use raise_service::RaiseService;
pub use user_service::UserService;
