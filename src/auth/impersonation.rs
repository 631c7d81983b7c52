use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::delegation::{self, DelegationClaims};
use crate::database::models::{Account, AuditAction, AuditEntry, Role};
use crate::database::store::{AuditSink, DataStore};
use crate::error::ApiError;

/// Redacted view of an active delegation, safe to return to the client.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedClaim {
    pub actor_email: String,
    pub target_email: String,
    pub target_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpersonationStatus {
    pub impersonating: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<RedactedClaim>,
}

/// Read-only status of an impersonation cookie. A malformed or expired
/// token reports "not impersonating" rather than failing - this runs behind
/// a UI banner on every page.
pub fn status(token: Option<&str>) -> ImpersonationStatus {
    let claim = token
        .and_then(|t| delegation::verify(t).ok())
        .map(|claims| RedactedClaim {
            actor_email: claims.actor_email,
            target_email: claims.target_email,
            target_id: claims.target_id,
            issued_at: DateTime::from_timestamp(claims.iat, 0).unwrap_or_else(Utc::now),
        });

    ImpersonationStatus {
        impersonating: claim.is_some(),
        claim,
    }
}

/// Starts and ends impersonation sessions: validates actor and target,
/// mints/retires the delegation token, writes the audit trail. The token is
/// self-contained, so ending a session is purely instructing the client to
/// drop its cookie.
pub struct ImpersonationService {
    store: Arc<dyn DataStore>,
    audit: Arc<dyn AuditSink>,
}

impl ImpersonationService {
    pub fn new(store: Arc<dyn DataStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    /// Begin impersonating `target_id` as `actor`.
    ///
    /// Returns the signed delegation token and the target account. Nested
    /// impersonation is rejected: one unambiguous actor per audit trail.
    pub async fn start(
        &self,
        actor: &Account,
        target_id: Uuid,
        current_token: Option<&str>,
    ) -> Result<(String, Account), ApiError> {
        if actor.role != Role::SuperAdmin {
            tracing::warn!(
                "Impersonation rejected: '{}' is not a super admin",
                actor.email
            );
            return Err(ApiError::forbidden("Only super admins can impersonate accounts"));
        }

        if current_token.is_some_and(|t| delegation::verify(t).is_ok()) {
            return Err(ApiError::AlreadyImpersonating);
        }

        let target = self
            .store
            .account_by_id(target_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Target account not found"))?;

        if target.role == Role::SuperAdmin {
            tracing::warn!(
                "Impersonation rejected: target '{}' is a super admin",
                target.email
            );
            return Err(ApiError::forbidden("Super admin accounts cannot be impersonated"));
        }

        if !target.is_active {
            return Err(ApiError::invalid_state("Target account is not active"));
        }

        let claims = DelegationClaims::new(actor, &target);
        let token = delegation::issue(&claims)?;

        self.audit
            .append(&AuditEntry::new(
                AuditAction::StartImpersonation,
                Some(target.id),
                format!("{} started impersonating {}", actor.email, target.email),
                json!({
                    "target_id": target.id,
                    "target_email": target.email,
                    "issued_at": claims.issued_at(),
                }),
                actor.id,
                &actor.email,
            ))
            .await?;

        tracing::info!(
            "Impersonation started: {} acting as {} ({})",
            actor.email,
            target.email,
            target.id
        );

        Ok((token, target))
    }

    /// End the impersonation session carried by `token`.
    ///
    /// Unlike resolution, an explicit end surfaces token problems: the
    /// caller asked to terminate a session that turns out not to exist
    /// validly.
    pub async fn end(&self, token: Option<&str>) -> Result<DelegationClaims, ApiError> {
        let token = token
            .ok_or_else(|| ApiError::invalid_state("No active impersonation session"))?;

        let claims = delegation::verify(token)?;

        let duration_minutes = (Utc::now().timestamp() - claims.iat).max(0) / 60;

        self.audit
            .append(&AuditEntry::new(
                AuditAction::EndImpersonation,
                Some(claims.target_id),
                format!(
                    "{} stopped impersonating {}",
                    claims.actor_email, claims.target_email
                ),
                json!({
                    "target_id": claims.target_id,
                    "target_email": claims.target_email,
                    "duration_minutes": duration_minutes,
                }),
                claims.actor_id,
                &claims.actor_email,
            ))
            .await?;

        tracing::info!(
            "Impersonation ended: {} stopped acting as {} after {} minutes",
            claims.actor_email,
            claims.target_email,
            duration_minutes
        );

        Ok(claims)
    }
}
