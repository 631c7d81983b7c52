use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Account, AuditEntry, Campaign, Company, ContactList, ContactMember, CreditTransaction,
    Template,
};
use crate::database::store::{AuditSink, DataStore, StoreError, StoreResult};

/// Production store backed by the main Postgres database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using DATABASE_URL via the shared pool manager
    pub async fn from_env() -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::main_pool().await?))
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let account =
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    async fn list_accounts(&self, company_id: Option<Uuid>) -> StoreResult<Vec<Account>> {
        let accounts = match company_id {
            Some(company_id) => {
                sqlx::query_as::<_, Account>(
                    "SELECT * FROM accounts WHERE company_id = $1 ORDER BY created_at",
                )
                .bind(company_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY created_at")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(accounts)
    }

    async fn create_account(&self, account: &Account) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, company_id, email, name, role, password_hash, is_active,
                 last_login_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(account.id)
        .bind(account.company_id)
        .bind(&account.email)
        .bind(&account.name)
        .bind(account.role)
        .bind(&account.password_hash)
        .bind(account.is_active)
        .bind(account.last_login_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("Account '{}' already exists", account.email))
            }
            other => StoreError::Sqlx(other),
        })?;
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET company_id = $2, email = $3, name = $4, role = $5,
                password_hash = $6, is_active = $7, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(account.id)
        .bind(account.company_id)
        .bind(&account.email)
        .bind(&account.name)
        .bind(account.role)
        .bind(&account.password_hash)
        .bind(account.is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Account not found".to_string()));
        }
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE accounts SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn company_by_id(&self, id: Uuid) -> StoreResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    async fn create_company(&self, company: &Company) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, name, is_active, credit_balance, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(company.is_active)
        .bind(company.credit_balance)
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("Company '{}' already exists", company.name))
            }
            other => StoreError::Sqlx(other),
        })?;
        Ok(())
    }

    async fn update_company(&self, company: &Company) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE companies SET name = $2, is_active = $3, updated_at = now() WHERE id = $1",
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(company.is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Company not found".to_string()));
        }
        Ok(())
    }

    async fn campaign_by_id(&self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Campaign>> {
        let campaign = sqlx::query_as::<_, Campaign>(
            "SELECT * FROM campaigns WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(campaign)
    }

    async fn list_campaigns(&self, company_id: Uuid) -> StoreResult<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            "SELECT * FROM campaigns WHERE company_id = $1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(campaigns)
    }

    async fn create_campaign(&self, campaign: &Campaign) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO campaigns
                (id, company_id, name, body, template_id, list_id, status,
                 scheduled_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(campaign.id)
        .bind(campaign.company_id)
        .bind(&campaign.name)
        .bind(&campaign.body)
        .bind(campaign.template_id)
        .bind(campaign.list_id)
        .bind(campaign.status)
        .bind(campaign.scheduled_at)
        .bind(campaign.created_at)
        .bind(campaign.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_campaign(&self, campaign: &Campaign) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET name = $3, body = $4, template_id = $5, list_id = $6,
                status = $7, scheduled_at = $8, updated_at = now()
            WHERE company_id = $1 AND id = $2
            "#,
        )
        .bind(campaign.company_id)
        .bind(campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.body)
        .bind(campaign.template_id)
        .bind(campaign.list_id)
        .bind(campaign.status)
        .bind(campaign.scheduled_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Campaign not found".to_string()));
        }
        Ok(())
    }

    async fn delete_campaign(&self, company_id: Uuid, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM campaigns WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Campaign not found".to_string()));
        }
        Ok(())
    }

    async fn template_by_id(&self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Template>> {
        let template = sqlx::query_as::<_, Template>(
            "SELECT * FROM templates WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(template)
    }

    async fn list_templates(&self, company_id: Uuid) -> StoreResult<Vec<Template>> {
        let templates = sqlx::query_as::<_, Template>(
            "SELECT * FROM templates WHERE company_id = $1 ORDER BY name",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    async fn create_template(&self, template: &Template) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO templates (id, company_id, name, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(template.id)
        .bind(template.company_id)
        .bind(&template.name)
        .bind(&template.body)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_template(&self, template: &Template) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE templates SET name = $3, body = $4, updated_at = now()
            WHERE company_id = $1 AND id = $2
            "#,
        )
        .bind(template.company_id)
        .bind(template.id)
        .bind(&template.name)
        .bind(&template.body)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Template not found".to_string()));
        }
        Ok(())
    }

    async fn delete_template(&self, company_id: Uuid, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM templates WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Template not found".to_string()));
        }
        Ok(())
    }

    async fn contact_list_by_id(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<ContactList>> {
        let list = sqlx::query_as::<_, ContactList>(
            "SELECT * FROM contact_lists WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(list)
    }

    async fn list_contact_lists(&self, company_id: Uuid) -> StoreResult<Vec<ContactList>> {
        let lists = sqlx::query_as::<_, ContactList>(
            "SELECT * FROM contact_lists WHERE company_id = $1 ORDER BY name",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lists)
    }

    async fn create_contact_list(&self, list: &ContactList) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contact_lists (id, company_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(list.id)
        .bind(list.company_id)
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.created_at)
        .bind(list.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_contact_list(&self, list: &ContactList) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE contact_lists SET name = $3, description = $4, updated_at = now()
            WHERE company_id = $1 AND id = $2
            "#,
        )
        .bind(list.company_id)
        .bind(list.id)
        .bind(&list.name)
        .bind(&list.description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Contact list not found".to_string()));
        }
        Ok(())
    }

    async fn delete_contact_list(&self, company_id: Uuid, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM contact_lists WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Contact list not found".to_string()));
        }
        Ok(())
    }

    async fn member_by_id(&self, list_id: Uuid, id: Uuid) -> StoreResult<Option<ContactMember>> {
        let member = sqlx::query_as::<_, ContactMember>(
            "SELECT * FROM contact_members WHERE list_id = $1 AND id = $2",
        )
        .bind(list_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn list_members(&self, list_id: Uuid) -> StoreResult<Vec<ContactMember>> {
        let members = sqlx::query_as::<_, ContactMember>(
            "SELECT * FROM contact_members WHERE list_id = $1 ORDER BY created_at",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn add_member(&self, member: &ContactMember) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contact_members
                (id, list_id, phone, name, subscribed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(member.id)
        .bind(member.list_id)
        .bind(&member.phone)
        .bind(&member.name)
        .bind(member.subscribed)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("'{}' is already on this list", member.phone))
            }
            other => StoreError::Sqlx(other),
        })?;
        Ok(())
    }

    async fn update_member(&self, member: &ContactMember) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE contact_members SET phone = $3, name = $4, subscribed = $5, updated_at = now()
            WHERE list_id = $1 AND id = $2
            "#,
        )
        .bind(member.list_id)
        .bind(member.id)
        .bind(&member.phone)
        .bind(&member.name)
        .bind(member.subscribed)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Contact not found".to_string()));
        }
        Ok(())
    }

    async fn remove_member(&self, list_id: Uuid, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM contact_members WHERE list_id = $1 AND id = $2")
            .bind(list_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Contact not found".to_string()));
        }
        Ok(())
    }

    async fn adjust_credits(
        &self,
        company_id: Uuid,
        delta: i64,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> StoreResult<CreditTransaction> {
        let mut tx = self.pool.begin().await?;

        // Balance update and ledger row commit or roll back together
        let balance_after: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE companies SET credit_balance = credit_balance + $2, updated_at = now()
            WHERE id = $1
            RETURNING credit_balance
            "#,
        )
        .bind(company_id)
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await?;

        let balance_after =
            balance_after.ok_or_else(|| StoreError::NotFound("Company not found".to_string()))?;

        let transaction = sqlx::query_as::<_, CreditTransaction>(
            r#"
            INSERT INTO credit_transactions
                (id, company_id, delta, balance_after, reason, actor_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(delta)
        .bind(balance_after)
        .bind(reason)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    async fn list_credit_transactions(
        &self,
        company_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<CreditTransaction>> {
        let transactions = sqlx::query_as::<_, CreditTransaction>(
            "SELECT * FROM credit_transactions WHERE company_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }
}

#[async_trait]
impl AuditSink for PgStore {
    async fn append(&self, entry: &AuditEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_entries
                (id, action, entity_id, description, metadata, actor_id, actor_email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.action)
        .bind(entry.entity_id)
        .bind(&entry.description)
        .bind(&entry.metadata)
        .bind(entry.actor_id)
        .bind(&entry.actor_email)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent(&self, limit: i64) -> StoreResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            "SELECT * FROM audit_entries ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
