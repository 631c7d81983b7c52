use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::resolver::EffectiveSession;
use crate::database::models::{Role, Template};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::tenant_scope;

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub body: Option<String>,
}

/// GET /dashboard/templates
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
) -> ApiResult<Vec<Template>> {
    let company_id = tenant_scope(&session)?;
    Ok(ApiResponse::success(state.store.list_templates(company_id).await?))
}

/// POST /dashboard/templates
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Json(payload): Json<CreateTemplateRequest>,
) -> ApiResult<Template> {
    let company_id = tenant_scope(&session)?;
    if payload.name.trim().is_empty() || payload.body.trim().is_empty() {
        return Err(ApiError::bad_request("Template name and body are required"));
    }

    let now = Utc::now();
    let template = Template {
        id: Uuid::new_v4(),
        company_id,
        name: payload.name.trim().to_string(),
        body: payload.body,
        created_at: now,
        updated_at: now,
    };
    state.store.create_template(&template).await?;
    Ok(ApiResponse::created(template))
}

/// GET /dashboard/templates/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Template> {
    let company_id = tenant_scope(&session)?;
    let template = state
        .store
        .template_by_id(company_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;
    Ok(ApiResponse::success(template))
}

/// PUT /dashboard/templates/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> ApiResult<Template> {
    let company_id = tenant_scope(&session)?;
    let mut template = state
        .store
        .template_by_id(company_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Template name cannot be empty"));
        }
        template.name = name.trim().to_string();
    }
    if let Some(body) = payload.body {
        template.body = body;
    }

    state.store.update_template(&template).await?;
    Ok(ApiResponse::success(template))
}

/// DELETE /dashboard/templates/:id - company admins only
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let company_id = tenant_scope(&session)?;
    if session.role != Role::CompanyAdmin {
        return Err(ApiError::forbidden("Only company admins can delete templates"));
    }

    state.store.delete_template(company_id, id).await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": id })))
}
