use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::Account;
use crate::error::ApiError;

/// Payload of an impersonation token: who is impersonating whom, and when
/// the delegation was issued. A fixed structure so verification rejects
/// malformed claims outright instead of leaving optional-field checks to
/// callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationClaims {
    pub actor_id: Uuid,
    pub actor_email: String,
    pub target_id: Uuid,
    pub target_email: String,
    pub iat: i64,
    pub exp: i64,
}

impl DelegationClaims {
    /// Snapshot actor and target at impersonation start. The claim, not the
    /// live profile, is the source of truth for who is impersonating.
    pub fn new(actor: &Account, target: &Account) -> Self {
        let now = Utc::now();
        Self {
            actor_id: actor.id,
            actor_email: actor.email.clone(),
            target_id: target.id,
            target_email: target.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds())).timestamp(),
        }
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_else(Utc::now)
    }
}

/// Delegation token lifetime in seconds; also the cookie Max-Age.
pub fn ttl_seconds() -> i64 {
    config::config().security.impersonation_ttl_hours as i64 * 3600
}

/// Sign a delegation claim into a compact URL-safe token
pub fn issue(claims: &DelegationClaims) -> Result<String, ApiError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(ApiError::internal_server_error("JWT secret not configured"));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| ApiError::internal_server_error(format!("token generation failed: {}", e)))
}

/// Verify signature and expiry of a delegation token
pub fn verify(token: &str) -> Result<DelegationClaims, ApiError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(ApiError::internal_server_error("JWT secret not configured"));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    // Expiry is exact: an 8-hour delegation does not get default leeway
    validation.leeway = 0;

    let token_data = decode::<DelegationClaims>(token, &decoding_key, &validation)
        .map_err(|e| ApiError::invalid_token(format!("Invalid impersonation token: {}", e)))?;

    Ok(token_data.claims)
}
