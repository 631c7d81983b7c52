use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    Extension,
};
use serde_json::json;

use crate::auth::cookies::{self, IMPERSONATION_COOKIE};
use crate::auth::impersonation::{self, ImpersonationService};
use crate::auth::resolver::EffectiveSession;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /dashboard/session - The session-with-impersonation query
///
/// Returns the dual-identity effective session: the identity in control
/// plus, when impersonating, the mirrored original actor.
pub async fn get_session(Extension(session): Extension<EffectiveSession>) -> ApiResult<EffectiveSession> {
    Ok(ApiResponse::success(session))
}

/// GET /dashboard/impersonation - Impersonation status
///
/// Read-only; a malformed or expired cookie reports "not impersonating"
/// rather than erroring, since the UI banner polls this on every page.
pub async fn impersonation_status(headers: HeaderMap) -> impl IntoResponse {
    let token = cookies::read_cookie(&headers, IMPERSONATION_COOKIE);
    ApiResponse::success(impersonation::status(token.as_deref()))
}

/// DELETE /dashboard/impersonation - End the active impersonation session
///
/// Verifies the delegation, writes the end audit entry attributed to the
/// original actor, and clears the cookie. The cleared cookie is the sole
/// termination mechanism for the stateless token.
pub async fn end_impersonation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = cookies::read_cookie(&headers, IMPERSONATION_COOKIE);

    let service = ImpersonationService::new(state.store.clone(), state.audit.clone());
    let claims = service.end(token.as_deref()).await?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookies::clear_cookie(IMPERSONATION_COOKIE))]),
        ApiResponse::success(json!({
            "ended": true,
            "actor_email": claims.actor_email,
            "target_email": claims.target_email,
        })),
    ))
}
