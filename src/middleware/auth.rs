use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::cookies::{self, SESSION_COOKIE};
use crate::auth::session::validate_session_token;
use crate::database::models::Account;
use crate::state::AppState;

/// Establish the real identity for a request, if any.
///
/// Accepts the session JWT from either a Bearer header or the session
/// cookie, then re-validates the account against the store so revoked or
/// deactivated accounts drop out immediately. Deliberately lenient: a
/// missing or bad token just leaves the request anonymous, and the route
/// gate decides what anonymous callers may reach.
pub async fn authenticate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers())
        .or_else(|| cookies::read_cookie(request.headers(), SESSION_COOKIE));

    if let Some(token) = token {
        match validate_session_token(&token) {
            Ok(claims) => match state.store.account_by_id(claims.sub).await {
                Ok(Some(account)) if account.is_active => {
                    tracing::debug!(
                        "Authenticated request as {} ({})",
                        account.email,
                        account.role.as_str()
                    );
                    request.extensions_mut().insert(account);
                }
                Ok(_) => {
                    tracing::warn!(
                        "Session token for missing or inactive account {}",
                        claims.sub
                    );
                }
                Err(e) => {
                    tracing::error!("Account lookup failed during authentication: {}", e);
                }
            },
            Err(msg) => {
                tracing::debug!("Ignoring invalid session token: {}", msg);
            }
        }
    }

    next.run(request).await
}

/// Extract a Bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
