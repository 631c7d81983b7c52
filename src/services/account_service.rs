use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::password;
use crate::database::models::{Account, AuditAction, AuditEntry, Company, Role};
use crate::database::store::{AuditSink, DataStore};
use crate::error::ApiError;

/// Account administration: signup and console-driven user management.
/// Owns the password-hashing and role invariants so handlers never touch
/// credentials or role logic directly.
pub struct AccountService {
    store: Arc<dyn DataStore>,
    audit: Arc<dyn AuditSink>,
}

/// Partial update applied by the console user editor.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

impl AccountService {
    pub fn new(store: Arc<dyn DataStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    /// Self-service signup: a new company plus its first company admin.
    pub async fn register_company(
        &self,
        company_name: &str,
        admin_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(Company, Account), ApiError> {
        validate_email(email)?;
        validate_password(password)?;
        if company_name.trim().is_empty() {
            return Err(ApiError::bad_request("Company name is required"));
        }

        if self.store.account_by_email(email).await?.is_some() {
            return Err(ApiError::conflict(format!(
                "An account with email '{}' already exists",
                email
            )));
        }

        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: company_name.trim().to_string(),
            is_active: true,
            credit_balance: 0,
            created_at: now,
            updated_at: now,
        };
        self.store.create_company(&company).await?;

        let account = Account {
            id: Uuid::new_v4(),
            company_id: Some(company.id),
            email: email.trim().to_lowercase(),
            name: admin_name.trim().to_string(),
            role: Role::CompanyAdmin,
            password_hash: password::hash_password(password)?,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.create_account(&account).await?;

        tracing::info!("Registered company '{}' with admin {}", company.name, account.email);
        Ok((company, account))
    }

    /// Console user creation. Super admin accounts are provisioned out of
    /// band, never through this path.
    pub async fn create_user(
        &self,
        actor: &Account,
        company_id: Uuid,
        email: &str,
        name: &str,
        role: Role,
        password: &str,
    ) -> Result<Account, ApiError> {
        validate_email(email)?;
        validate_password(password)?;
        if role == Role::SuperAdmin {
            return Err(ApiError::forbidden("Cannot create super admin accounts via the API"));
        }

        let company = self
            .store
            .company_by_id(company_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Company not found"))?;
        if !company.is_active {
            return Err(ApiError::invalid_state("Company is not active"));
        }

        if self.store.account_by_email(email).await?.is_some() {
            return Err(ApiError::conflict(format!(
                "An account with email '{}' already exists",
                email
            )));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            company_id: Some(company_id),
            email: email.trim().to_lowercase(),
            name: name.trim().to_string(),
            role,
            password_hash: password::hash_password(password)?,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.create_account(&account).await?;

        self.audit
            .append(&AuditEntry::new(
                AuditAction::UserCreated,
                Some(account.id),
                format!("Created {} account {}", role.as_str(), account.email),
                json!({ "company_id": company_id, "role": role }),
                actor.id,
                &actor.email,
            ))
            .await?;

        Ok(account)
    }

    /// Console user edit: profile, role, activation, password reset.
    pub async fn update_user(
        &self,
        actor: &Account,
        user_id: Uuid,
        changes: UserChanges,
    ) -> Result<Account, ApiError> {
        let mut account = self
            .store
            .account_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Account not found"))?;

        if account.role == Role::SuperAdmin {
            return Err(ApiError::forbidden("Super admin accounts cannot be edited via the API"));
        }

        let mut changed: Vec<&str> = Vec::new();
        if let Some(name) = changes.name {
            account.name = name.trim().to_string();
            changed.push("name");
        }
        if let Some(role) = changes.role {
            if role == Role::SuperAdmin {
                return Err(ApiError::forbidden("Cannot promote accounts to super admin via the API"));
            }
            account.role = role;
            changed.push("role");
        }
        if let Some(is_active) = changes.is_active {
            account.is_active = is_active;
            changed.push("is_active");
        }
        if let Some(password) = changes.password {
            validate_password(&password)?;
            account.password_hash = password::hash_password(&password)?;
            changed.push("password");
        }

        if changed.is_empty() {
            return Err(ApiError::bad_request("No changes supplied"));
        }

        self.store.update_account(&account).await?;

        self.audit
            .append(&AuditEntry::new(
                AuditAction::UserUpdated,
                Some(account.id),
                format!("Updated account {}", account.email),
                json!({ "fields": changed }),
                actor.id,
                &actor.email,
            ))
            .await?;

        Ok(account)
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::bad_request("Password must be at least 8 characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::AuditSink;
    use crate::testing::{fixtures, MemoryStore};

    fn service(store: Arc<MemoryStore>) -> AccountService {
        AccountService::new(store.clone(), store)
    }

    #[tokio::test]
    async fn register_creates_company_and_admin() {
        let store = Arc::new(MemoryStore::new());
        let (company, account) = service(store.clone())
            .register_company("Acme", "Ann", "ann@acme.example", "password1")
            .await
            .unwrap();

        assert_eq!(account.role, Role::CompanyAdmin);
        assert_eq!(account.company_id, Some(company.id));
        assert!(crate::auth::password::verify_password(
            &account.password_hash,
            "password1"
        ));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);
        svc.register_company("Acme", "Ann", "ann@acme.example", "password1")
            .await
            .unwrap();

        let err = svc
            .register_company("Other", "Bob", "ann@acme.example", "password2")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[tokio::test]
    async fn create_user_audits_the_actor() {
        let store = Arc::new(MemoryStore::new());
        let admin = fixtures::super_admin();
        let company = fixtures::company();
        store.seed_company(company.clone());

        let account = service(store.clone())
            .create_user(&admin, company.id, "u@acme.example", "U", Role::User, "password1")
            .await
            .unwrap();
        assert_eq!(account.role, Role::User);

        let entries = store.recent(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::UserCreated);
        assert_eq!(entries[0].actor_id, admin.id);
    }

    #[tokio::test]
    async fn cannot_create_or_promote_super_admins() {
        let store = Arc::new(MemoryStore::new());
        let admin = fixtures::super_admin();
        let company = fixtures::company();
        store.seed_company(company.clone());
        let svc = service(store.clone());

        let err = svc
            .create_user(&admin, company.id, "x@y.example", "X", Role::SuperAdmin, "password1")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");

        let user = fixtures::user(company.id);
        store.seed_account(user.clone());
        let err = svc
            .update_user(
                &admin,
                user.id,
                UserChanges {
                    role: Some(Role::SuperAdmin),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn deactivation_round_trips() {
        let store = Arc::new(MemoryStore::new());
        let admin = fixtures::super_admin();
        let company = fixtures::company();
        store.seed_company(company.clone());
        let user = fixtures::user(company.id);
        store.seed_account(user.clone());

        let updated = service(store.clone())
            .update_user(
                &admin,
                user.id,
                UserChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_active);
    }
}
