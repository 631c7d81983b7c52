use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    Account, AuditEntry, Campaign, Company, ContactList, ContactMember, CreditTransaction,
    Template,
};

/// Errors from store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD operations on tenant data. The identity/authorization core only
/// reads accounts through this seam; the rest is the back-office surface.
///
/// Tenant-scoped reads take the owning `company_id` so a handler can never
/// reach across companies by id alone.
#[async_trait]
pub trait DataStore: Send + Sync {
    // Accounts
    async fn account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;
    async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    async fn list_accounts(&self, company_id: Option<Uuid>) -> StoreResult<Vec<Account>>;
    async fn create_account(&self, account: &Account) -> StoreResult<()>;
    async fn update_account(&self, account: &Account) -> StoreResult<()>;
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;

    // Companies
    async fn company_by_id(&self, id: Uuid) -> StoreResult<Option<Company>>;
    async fn list_companies(&self) -> StoreResult<Vec<Company>>;
    async fn create_company(&self, company: &Company) -> StoreResult<()>;
    async fn update_company(&self, company: &Company) -> StoreResult<()>;

    // Campaigns
    async fn campaign_by_id(&self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Campaign>>;
    async fn list_campaigns(&self, company_id: Uuid) -> StoreResult<Vec<Campaign>>;
    async fn create_campaign(&self, campaign: &Campaign) -> StoreResult<()>;
    async fn update_campaign(&self, campaign: &Campaign) -> StoreResult<()>;
    async fn delete_campaign(&self, company_id: Uuid, id: Uuid) -> StoreResult<()>;

    // Templates
    async fn template_by_id(&self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Template>>;
    async fn list_templates(&self, company_id: Uuid) -> StoreResult<Vec<Template>>;
    async fn create_template(&self, template: &Template) -> StoreResult<()>;
    async fn update_template(&self, template: &Template) -> StoreResult<()>;
    async fn delete_template(&self, company_id: Uuid, id: Uuid) -> StoreResult<()>;

    // Contact lists and members
    async fn contact_list_by_id(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<ContactList>>;
    async fn list_contact_lists(&self, company_id: Uuid) -> StoreResult<Vec<ContactList>>;
    async fn create_contact_list(&self, list: &ContactList) -> StoreResult<()>;
    async fn update_contact_list(&self, list: &ContactList) -> StoreResult<()>;
    async fn delete_contact_list(&self, company_id: Uuid, id: Uuid) -> StoreResult<()>;

    async fn member_by_id(&self, list_id: Uuid, id: Uuid) -> StoreResult<Option<ContactMember>>;
    async fn list_members(&self, list_id: Uuid) -> StoreResult<Vec<ContactMember>>;
    async fn add_member(&self, member: &ContactMember) -> StoreResult<()>;
    async fn update_member(&self, member: &ContactMember) -> StoreResult<()>;
    async fn remove_member(&self, list_id: Uuid, id: Uuid) -> StoreResult<()>;

    // Credit ledger. The balance update and the ledger row are one atomic
    // write; `balance_after` in the returned row reflects the new balance.
    async fn adjust_credits(
        &self,
        company_id: Uuid,
        delta: i64,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> StoreResult<CreditTransaction>;
    async fn list_credit_transactions(
        &self,
        company_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<CreditTransaction>>;
}

/// Append-only audit log.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> StoreResult<()>;
    async fn recent(&self, limit: i64) -> StoreResult<Vec<AuditEntry>>;
}
