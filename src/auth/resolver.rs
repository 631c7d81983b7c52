use serde::Serialize;
use uuid::Uuid;

use crate::auth::delegation;
use crate::database::models::{Account, Role};
use crate::database::store::DataStore;

/// Mirror of the real actor behind an impersonated session, snapshotted from
/// the delegation claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginalActor {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub name: String,
}

/// The identity presented to authorization and to the UI for one request:
/// the impersonated target if a valid delegation is in force, otherwise the
/// real identity. Computed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveSession {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub is_impersonating: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<OriginalActor>,
}

impl EffectiveSession {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role,
            company_id: account.company_id,
            is_impersonating: false,
            original: None,
        }
    }
}

/// Compute the effective identity for a request.
///
/// Read-only and idempotent; called on every request. A missing, invalid,
/// foreign or expired token - or a target that has vanished or been
/// deactivated since issuance - degrades to the base identity. It never
/// errors: a stale cookie must not block the admin's own session.
pub async fn resolve(
    base: &Account,
    token: Option<&str>,
    store: &dyn DataStore,
) -> EffectiveSession {
    let Some(token) = token else {
        return EffectiveSession::from_account(base);
    };

    // Impersonation is strictly a super-admin capability; anyone else
    // presenting a delegation cookie is ignored, not rejected.
    if base.role != Role::SuperAdmin {
        tracing::debug!(
            "Ignoring impersonation token presented by non-super-admin '{}'",
            base.email
        );
        return EffectiveSession::from_account(base);
    }

    let claims = match delegation::verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Ignoring unverifiable impersonation token: {}", e);
            return EffectiveSession::from_account(base);
        }
    };

    // A cookie minted for a different super-admin is a stale browser
    // artifact, not this actor's delegation
    if claims.actor_id != base.id {
        tracing::debug!(
            "Ignoring impersonation token issued to {} presented by {}",
            claims.actor_email,
            base.email
        );
        return EffectiveSession::from_account(base);
    }

    let target = match store.account_by_id(claims.target_id).await {
        Ok(Some(target)) if target.is_active => target,
        Ok(_) => {
            tracing::debug!(
                "Impersonation target {} missing or inactive; falling back to real identity",
                claims.target_id
            );
            return EffectiveSession::from_account(base);
        }
        Err(e) => {
            tracing::warn!("Target lookup failed during session resolution: {}", e);
            return EffectiveSession::from_account(base);
        }
    };

    EffectiveSession {
        id: target.id,
        email: target.email,
        name: target.name,
        role: target.role,
        company_id: target.company_id,
        is_impersonating: true,
        // Actor id/email come from the claim, which stays authoritative even
        // if the actor's profile changed mid-session
        original: Some(OriginalActor {
            id: claims.actor_id,
            email: claims.actor_email,
            role: Role::SuperAdmin,
            name: base.name.clone(),
        }),
    }
}
