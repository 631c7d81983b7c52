use chrono::Utc;

use crate::auth::password;
use crate::database::models::Account;
use crate::database::store::DataStore;
use crate::error::ApiError;

/// Verify a credential pair and return the base identity.
///
/// Unknown address, inactive account and wrong password all fail with the
/// same `InvalidCredentials` so a caller cannot distinguish a disabled
/// account from a typo.
pub async fn authenticate(
    store: &dyn DataStore,
    email: &str,
    password: &str,
) -> Result<Account, ApiError> {
    let account = store.account_by_email(email).await?;

    let account = match account {
        Some(account) if account.is_active => account,
        Some(_) => {
            tracing::warn!("Login attempt for inactive account '{}'", email);
            return Err(ApiError::InvalidCredentials);
        }
        None => {
            tracing::warn!("Login attempt for unknown account '{}'", email);
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !password::verify_password(&account.password_hash, password) {
        tracing::warn!("Password mismatch for account '{}'", email);
        return Err(ApiError::InvalidCredentials);
    }

    store.record_login(account.id, Utc::now()).await?;
    tracing::debug!("Authenticated {} ({})", account.email, account.role.as_str());

    Ok(account)
}
