use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::cookies::{self, IMPERSONATION_COOKIE};
use crate::auth::delegation;
use crate::auth::impersonation::ImpersonationService;
use crate::database::models::Account;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartImpersonationRequest {
    pub target_id: Uuid,
}

/// POST /admin/impersonation - Start impersonating an account
///
/// Expected Input:
/// ```json
/// { "target_id": "account-uuid" }
/// ```
///
/// On success the delegation cookie is set for 8 hours and the response
/// carries the target identity summary. The client should force a full
/// reload so all session-derived UI recomputes against the new identity.
pub async fn start(
    State(state): State<AppState>,
    Extension(actor): Extension<Account>,
    headers: HeaderMap,
    Json(payload): Json<StartImpersonationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let current = cookies::read_cookie(&headers, IMPERSONATION_COOKIE);

    let service = ImpersonationService::new(state.store.clone(), state.audit.clone());
    let (token, target) = service
        .start(&actor, payload.target_id, current.as_deref())
        .await?;

    let ttl = delegation::ttl_seconds();
    Ok((
        AppendHeaders([(SET_COOKIE, cookies::set_cookie(IMPERSONATION_COOKIE, &token, ttl))]),
        ApiResponse::success(json!({
            "impersonating": true,
            "target": target.summary(),
            "expires_in": ttl,
        })),
    ))
}
