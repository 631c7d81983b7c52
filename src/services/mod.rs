pub mod account_service;
pub mod credit_service;

pub use account_service::{AccountService, UserChanges};
pub use credit_service::CreditService;
