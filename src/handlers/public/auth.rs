use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::authenticator;
use crate::auth::cookies::{self, IMPERSONATION_COOKIE, SESSION_COOKIE};
use crate::auth::session::{generate_session_token, SessionClaims};
use crate::config;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::AccountService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub company_name: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Authenticate and receive a session token
///
/// Expected Input:
/// ```json
/// { "email": "admin@x.com", "password": "..." }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "user": { "id": "...", "email": "...", "role": "COMPANY_ADMIN", "company_id": "..." },
///     "expires_in": 86400
///   }
/// }
/// ```
///
/// The token is also set as the session cookie for browser clients.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let account =
        authenticator::authenticate(state.store.as_ref(), payload.email.trim(), &payload.password)
            .await?;

    let token = generate_session_token(SessionClaims::new(&account))
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    let expires_in = config::config().security.jwt_expiry_hours as i64 * 3600;

    Ok((
        AppendHeaders([(SET_COOKIE, cookies::set_cookie(SESSION_COOKIE, &token, expires_in))]),
        ApiResponse::success(json!({
            "token": token,
            "user": account.summary(),
            "expires_in": expires_in,
        })),
    ))
}

/// POST /auth/register - Create a company and its first admin account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = AccountService::new(state.store.clone(), state.audit.clone());
    let (company, account) = service
        .register_company(
            &payload.company_name,
            &payload.name,
            &payload.email,
            &payload.password,
        )
        .await?;

    Ok(ApiResponse::created(json!({
        "company": { "id": company.id, "name": company.name },
        "user": account.summary(),
    })))
}

/// POST /auth/logout - Drop the session
///
/// Clears both the session cookie and any impersonation cookie; a signed-out
/// browser must not carry a live delegation.
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([
            (SET_COOKIE, cookies::clear_cookie(SESSION_COOKIE)),
            (SET_COOKIE, cookies::clear_cookie(IMPERSONATION_COOKIE)),
        ]),
        ApiResponse::success(json!({ "logged_out": true })),
    )
}
