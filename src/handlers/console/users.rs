use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Account, Role};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AccountService, UserChanges};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub company_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

/// GET /admin/users[?company_id=...]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Vec<Account>> {
    Ok(ApiResponse::success(
        state.store.list_accounts(query.company_id).await?,
    ))
}

/// GET /admin/users/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Account> {
    let account = state
        .store
        .account_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;
    Ok(ApiResponse::success(account))
}

/// POST /admin/users
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Account>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<Account> {
    let service = AccountService::new(state.store.clone(), state.audit.clone());
    let account = service
        .create_user(
            &actor,
            payload.company_id,
            &payload.email,
            &payload.name,
            payload.role,
            &payload.password,
        )
        .await?;
    Ok(ApiResponse::created(account))
}

/// PUT /admin/users/:id - profile, role, activation, password reset
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Account>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Account> {
    let service = AccountService::new(state.store.clone(), state.audit.clone());
    let account = service
        .update_user(
            &actor,
            id,
            UserChanges {
                name: payload.name,
                role: payload.role,
                is_active: payload.is_active,
                password: payload.password,
            },
        )
        .await?;
    Ok(ApiResponse::success(account))
}
