use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::cookies::{self, IMPERSONATION_COOKIE};
use crate::auth::resolver;
use crate::database::models::Account;
use crate::state::AppState;

/// Resolve the effective session for an authenticated request.
///
/// Runs after `authenticate_middleware`; for anonymous requests there is
/// nothing to resolve. The resolver is read-only and swallows token
/// problems, so this layer can never turn a stale cookie into an error.
pub async fn effective_session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(account) = request.extensions().get::<Account>().cloned() {
        let token = cookies::read_cookie(request.headers(), IMPERSONATION_COOKIE);
        let session =
            resolver::resolve(&account, token.as_deref(), state.store.as_ref()).await;

        if session.is_impersonating {
            tracing::debug!(
                "Request by {} resolved to impersonated identity {}",
                account.email,
                session.email
            );
        }
        request.extensions_mut().insert(session);
    }

    next.run(request).await
}
