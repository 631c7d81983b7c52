use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::resolver::EffectiveSession;
use crate::database::models::{ContactList, ContactMember, Role};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::tenant_scope;

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub phone: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    pub subscribed: bool,
}

/// GET /dashboard/lists
pub async fn list_lists(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
) -> ApiResult<Vec<ContactList>> {
    let company_id = tenant_scope(&session)?;
    Ok(ApiResponse::success(state.store.list_contact_lists(company_id).await?))
}

/// POST /dashboard/lists
pub async fn create_list(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Json(payload): Json<CreateListRequest>,
) -> ApiResult<ContactList> {
    let company_id = tenant_scope(&session)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("List name is required"));
    }

    let now = Utc::now();
    let list = ContactList {
        id: Uuid::new_v4(),
        company_id,
        name: payload.name.trim().to_string(),
        description: payload.description,
        created_at: now,
        updated_at: now,
    };
    state.store.create_contact_list(&list).await?;
    Ok(ApiResponse::created(list))
}

/// PUT /dashboard/lists/:id
pub async fn update_list(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListRequest>,
) -> ApiResult<ContactList> {
    let company_id = tenant_scope(&session)?;
    let mut list = state
        .store
        .contact_list_by_id(company_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact list not found"))?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("List name cannot be empty"));
        }
        list.name = name.trim().to_string();
    }
    if payload.description.is_some() {
        list.description = payload.description;
    }

    state.store.update_contact_list(&list).await?;
    Ok(ApiResponse::success(list))
}

/// DELETE /dashboard/lists/:id - company admins only
pub async fn delete_list(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let company_id = tenant_scope(&session)?;
    if session.role != Role::CompanyAdmin {
        return Err(ApiError::forbidden("Only company admins can delete contact lists"));
    }

    state.store.delete_contact_list(company_id, id).await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": id })))
}

/// GET /dashboard/lists/:id/members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<Vec<ContactMember>> {
    let company_id = tenant_scope(&session)?;
    state
        .store
        .contact_list_by_id(company_id, list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact list not found"))?;

    Ok(ApiResponse::success(state.store.list_members(list_id).await?))
}

/// POST /dashboard/lists/:id/members
pub async fn add_member(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(list_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<ContactMember> {
    let company_id = tenant_scope(&session)?;
    state
        .store
        .contact_list_by_id(company_id, list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact list not found"))?;

    let phone = normalize_phone(&payload.phone)?;

    let now = Utc::now();
    let member = ContactMember {
        id: Uuid::new_v4(),
        list_id,
        phone,
        name: payload.name,
        subscribed: true,
        created_at: now,
        updated_at: now,
    };
    state.store.add_member(&member).await?;
    Ok(ApiResponse::created(member))
}

/// DELETE /dashboard/lists/:id/members/:member_id
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path((list_id, member_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<serde_json::Value> {
    let company_id = tenant_scope(&session)?;
    state
        .store
        .contact_list_by_id(company_id, list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact list not found"))?;

    state.store.remove_member(list_id, member_id).await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": member_id })))
}

/// PUT /dashboard/lists/:id/members/:member_id/subscription
pub async fn set_subscription(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path((list_id, member_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SubscriptionRequest>,
) -> ApiResult<ContactMember> {
    let company_id = tenant_scope(&session)?;
    state
        .store
        .contact_list_by_id(company_id, list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact list not found"))?;

    let mut member = state
        .store
        .member_by_id(list_id, member_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;

    member.subscribed = payload.subscribed;
    member.updated_at = Utc::now();
    state.store.update_member(&member).await?;

    Ok(ApiResponse::success(member))
}

/// E.164-ish sanity check; full carrier validation belongs to the delivery
/// pipeline, not the back office.
fn normalize_phone(raw: &str) -> Result<String, ApiError> {
    let phone: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    let digits = phone.strip_prefix('+').unwrap_or(&phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) || digits.len() < 7 {
        return Err(ApiError::bad_request(format!("'{}' is not a valid phone number", raw)));
    }
    Ok(phone)
}
