//! Test support: an in-memory DataStore/AuditSink and account fixtures.
//! Used by unit tests and the integration suite; never wired up in main.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{
    Account, AuditEntry, Campaign, Company, ContactList, ContactMember, CreditTransaction,
    Template,
};
use crate::database::store::{AuditSink, DataStore, StoreError, StoreResult};

/// In-memory store. Lock discipline is simple because no method awaits
/// while holding a guard.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
    companies: RwLock<HashMap<Uuid, Company>>,
    campaigns: RwLock<HashMap<Uuid, Campaign>>,
    templates: RwLock<HashMap<Uuid, Template>>,
    contact_lists: RwLock<HashMap<Uuid, ContactList>>,
    contact_members: RwLock<HashMap<Uuid, ContactMember>>,
    credit_transactions: RwLock<Vec<CreditTransaction>>,
    audit_entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_account(&self, account: Account) {
        self.accounts.write().unwrap().insert(account.id, account);
    }

    pub fn seed_company(&self, company: Company) {
        self.companies.write().unwrap().insert(company.id, company);
    }

    /// All audit entries in insertion order, for assertions.
    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit_entries.read().unwrap().clone()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn account_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().unwrap().get(&id).cloned())
    }

    async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .unwrap()
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_accounts(&self, company_id: Option<Uuid>) -> StoreResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .accounts
            .read()
            .unwrap()
            .values()
            .filter(|a| company_id.is_none() || a.company_id == company_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }

    async fn create_account(&self, account: &Account) -> StoreResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        if accounts
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(StoreError::Conflict(format!(
                "Account '{}' already exists",
                account.email
            )));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> StoreResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        if !accounts.contains_key(&account.id) {
            return Err(StoreError::NotFound("Account not found".to_string()));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        if let Some(account) = self.accounts.write().unwrap().get_mut(&id) {
            account.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn company_by_id(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(self.companies.read().unwrap().get(&id).cloned())
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let mut companies: Vec<Company> =
            self.companies.read().unwrap().values().cloned().collect();
        companies.sort_by_key(|c| c.created_at);
        Ok(companies)
    }

    async fn create_company(&self, company: &Company) -> StoreResult<()> {
        let mut companies = self.companies.write().unwrap();
        if companies.values().any(|c| c.name == company.name) {
            return Err(StoreError::Conflict(format!(
                "Company '{}' already exists",
                company.name
            )));
        }
        companies.insert(company.id, company.clone());
        Ok(())
    }

    async fn update_company(&self, company: &Company) -> StoreResult<()> {
        let mut companies = self.companies.write().unwrap();
        if !companies.contains_key(&company.id) {
            return Err(StoreError::NotFound("Company not found".to_string()));
        }
        companies.insert(company.id, company.clone());
        Ok(())
    }

    async fn campaign_by_id(&self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Campaign>> {
        Ok(self
            .campaigns
            .read()
            .unwrap()
            .get(&id)
            .filter(|c| c.company_id == company_id)
            .cloned())
    }

    async fn list_campaigns(&self, company_id: Uuid) -> StoreResult<Vec<Campaign>> {
        let mut campaigns: Vec<Campaign> = self
            .campaigns
            .read()
            .unwrap()
            .values()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect();
        campaigns.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        Ok(campaigns)
    }

    async fn create_campaign(&self, campaign: &Campaign) -> StoreResult<()> {
        self.campaigns
            .write()
            .unwrap()
            .insert(campaign.id, campaign.clone());
        Ok(())
    }

    async fn update_campaign(&self, campaign: &Campaign) -> StoreResult<()> {
        let mut campaigns = self.campaigns.write().unwrap();
        match campaigns.get(&campaign.id) {
            Some(existing) if existing.company_id == campaign.company_id => {
                campaigns.insert(campaign.id, campaign.clone());
                Ok(())
            }
            _ => Err(StoreError::NotFound("Campaign not found".to_string())),
        }
    }

    async fn delete_campaign(&self, company_id: Uuid, id: Uuid) -> StoreResult<()> {
        let mut campaigns = self.campaigns.write().unwrap();
        match campaigns.get(&id) {
            Some(existing) if existing.company_id == company_id => {
                campaigns.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::NotFound("Campaign not found".to_string())),
        }
    }

    async fn template_by_id(&self, company_id: Uuid, id: Uuid) -> StoreResult<Option<Template>> {
        Ok(self
            .templates
            .read()
            .unwrap()
            .get(&id)
            .filter(|t| t.company_id == company_id)
            .cloned())
    }

    async fn list_templates(&self, company_id: Uuid) -> StoreResult<Vec<Template>> {
        let mut templates: Vec<Template> = self
            .templates
            .read()
            .unwrap()
            .values()
            .filter(|t| t.company_id == company_id)
            .cloned()
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn create_template(&self, template: &Template) -> StoreResult<()> {
        self.templates
            .write()
            .unwrap()
            .insert(template.id, template.clone());
        Ok(())
    }

    async fn update_template(&self, template: &Template) -> StoreResult<()> {
        let mut templates = self.templates.write().unwrap();
        match templates.get(&template.id) {
            Some(existing) if existing.company_id == template.company_id => {
                templates.insert(template.id, template.clone());
                Ok(())
            }
            _ => Err(StoreError::NotFound("Template not found".to_string())),
        }
    }

    async fn delete_template(&self, company_id: Uuid, id: Uuid) -> StoreResult<()> {
        let mut templates = self.templates.write().unwrap();
        match templates.get(&id) {
            Some(existing) if existing.company_id == company_id => {
                templates.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::NotFound("Template not found".to_string())),
        }
    }

    async fn contact_list_by_id(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<ContactList>> {
        Ok(self
            .contact_lists
            .read()
            .unwrap()
            .get(&id)
            .filter(|l| l.company_id == company_id)
            .cloned())
    }

    async fn list_contact_lists(&self, company_id: Uuid) -> StoreResult<Vec<ContactList>> {
        let mut lists: Vec<ContactList> = self
            .contact_lists
            .read()
            .unwrap()
            .values()
            .filter(|l| l.company_id == company_id)
            .cloned()
            .collect();
        lists.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(lists)
    }

    async fn create_contact_list(&self, list: &ContactList) -> StoreResult<()> {
        self.contact_lists
            .write()
            .unwrap()
            .insert(list.id, list.clone());
        Ok(())
    }

    async fn update_contact_list(&self, list: &ContactList) -> StoreResult<()> {
        let mut lists = self.contact_lists.write().unwrap();
        match lists.get(&list.id) {
            Some(existing) if existing.company_id == list.company_id => {
                lists.insert(list.id, list.clone());
                Ok(())
            }
            _ => Err(StoreError::NotFound("Contact list not found".to_string())),
        }
    }

    async fn delete_contact_list(&self, company_id: Uuid, id: Uuid) -> StoreResult<()> {
        let mut lists = self.contact_lists.write().unwrap();
        match lists.get(&id) {
            Some(existing) if existing.company_id == company_id => {
                lists.remove(&id);
                self.contact_members
                    .write()
                    .unwrap()
                    .retain(|_, m| m.list_id != id);
                Ok(())
            }
            _ => Err(StoreError::NotFound("Contact list not found".to_string())),
        }
    }

    async fn member_by_id(&self, list_id: Uuid, id: Uuid) -> StoreResult<Option<ContactMember>> {
        Ok(self
            .contact_members
            .read()
            .unwrap()
            .get(&id)
            .filter(|m| m.list_id == list_id)
            .cloned())
    }

    async fn list_members(&self, list_id: Uuid) -> StoreResult<Vec<ContactMember>> {
        let mut members: Vec<ContactMember> = self
            .contact_members
            .read()
            .unwrap()
            .values()
            .filter(|m| m.list_id == list_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.created_at);
        Ok(members)
    }

    async fn add_member(&self, member: &ContactMember) -> StoreResult<()> {
        let mut members = self.contact_members.write().unwrap();
        if members
            .values()
            .any(|m| m.list_id == member.list_id && m.phone == member.phone)
        {
            return Err(StoreError::Conflict(format!(
                "'{}' is already on this list",
                member.phone
            )));
        }
        members.insert(member.id, member.clone());
        Ok(())
    }

    async fn update_member(&self, member: &ContactMember) -> StoreResult<()> {
        let mut members = self.contact_members.write().unwrap();
        match members.get(&member.id) {
            Some(existing) if existing.list_id == member.list_id => {
                members.insert(member.id, member.clone());
                Ok(())
            }
            _ => Err(StoreError::NotFound("Contact not found".to_string())),
        }
    }

    async fn remove_member(&self, list_id: Uuid, id: Uuid) -> StoreResult<()> {
        let mut members = self.contact_members.write().unwrap();
        match members.get(&id) {
            Some(existing) if existing.list_id == list_id => {
                members.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::NotFound("Contact not found".to_string())),
        }
    }

    async fn adjust_credits(
        &self,
        company_id: Uuid,
        delta: i64,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> StoreResult<CreditTransaction> {
        let mut companies = self.companies.write().unwrap();
        let company = companies
            .get_mut(&company_id)
            .ok_or_else(|| StoreError::NotFound("Company not found".to_string()))?;

        company.credit_balance += delta;
        company.updated_at = Utc::now();

        let transaction = CreditTransaction {
            id: Uuid::new_v4(),
            company_id,
            delta,
            balance_after: company.credit_balance,
            reason: reason.to_string(),
            actor_id,
            created_at: Utc::now(),
        };
        self.credit_transactions
            .write()
            .unwrap()
            .push(transaction.clone());
        Ok(transaction)
    }

    async fn list_credit_transactions(
        &self,
        company_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<CreditTransaction>> {
        let transactions = self.credit_transactions.read().unwrap();
        Ok(transactions
            .iter()
            .rev()
            .filter(|t| t.company_id == company_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditSink for MemoryStore {
    async fn append(&self, entry: &AuditEntry) -> StoreResult<()> {
        self.audit_entries.write().unwrap().push(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: i64) -> StoreResult<Vec<AuditEntry>> {
        let entries = self.audit_entries.read().unwrap();
        Ok(entries.iter().rev().take(limit as usize).cloned().collect())
    }
}

/// Account and company builders with unique emails/names per call.
pub mod fixtures {
    use super::*;
    use crate::auth::password;
    use crate::database::models::Role;

    fn short_id() -> String {
        Uuid::new_v4().to_string()[..8].to_string()
    }

    fn account(role: Role, company_id: Option<Uuid>) -> Account {
        let tag = short_id();
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            company_id,
            email: format!("{}-{}@textwave.example", role.as_str().to_lowercase(), tag),
            name: format!("Fixture {}", tag),
            role,
            // Never verifies; use with_password for login tests
            password_hash: String::new(),
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn super_admin() -> Account {
        account(Role::SuperAdmin, None)
    }

    pub fn company_admin() -> Account {
        account(Role::CompanyAdmin, Some(Uuid::new_v4()))
    }

    pub fn user(company_id: Uuid) -> Account {
        account(Role::User, Some(company_id))
    }

    pub fn with_password(mut account: Account, password: &str) -> Account {
        account.password_hash = password::hash_password(password).unwrap();
        account
    }

    pub fn company() -> Company {
        let now = Utc::now();
        Company {
            id: Uuid::new_v4(),
            name: format!("Company {}", short_id()),
            is_active: true,
            credit_balance: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
