pub mod account;
pub mod audit;
pub mod campaign;
pub mod company;
pub mod contact;
pub mod credit;
pub mod template;

pub use account::{Account, Role};
pub use audit::{AuditAction, AuditEntry};
pub use campaign::{Campaign, CampaignStatus};
pub use company::Company;
pub use contact::{ContactList, ContactMember};
pub use credit::CreditTransaction;
pub use template::Template;
