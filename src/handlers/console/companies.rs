use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::models::{Account, AuditAction, AuditEntry, Company};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /admin/companies
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Company>> {
    Ok(ApiResponse::success(state.store.list_companies().await?))
}

/// POST /admin/companies
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Account>,
    Json(payload): Json<CreateCompanyRequest>,
) -> ApiResult<Company> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("Company name is required"));
    }

    let now = Utc::now();
    let company = Company {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        is_active: true,
        credit_balance: 0,
        created_at: now,
        updated_at: now,
    };
    state.store.create_company(&company).await?;

    state
        .audit
        .append(&AuditEntry::new(
            AuditAction::CompanyCreated,
            Some(company.id),
            format!("Created company '{}'", company.name),
            json!({ "name": company.name }),
            actor.id,
            &actor.email,
        ))
        .await?;

    Ok(ApiResponse::created(company))
}

/// GET /admin/companies/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Company> {
    let company = state
        .store
        .company_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;
    Ok(ApiResponse::success(company))
}

/// PUT /admin/companies/:id - rename or toggle activation
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Account>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> ApiResult<Company> {
    let mut company = state
        .store
        .company_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    let mut changed: Vec<&str> = Vec::new();
    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Company name cannot be empty"));
        }
        company.name = name.trim().to_string();
        changed.push("name");
    }
    if let Some(is_active) = payload.is_active {
        company.is_active = is_active;
        changed.push("is_active");
    }
    if changed.is_empty() {
        return Err(ApiError::bad_request("No changes supplied"));
    }

    state.store.update_company(&company).await?;

    state
        .audit
        .append(&AuditEntry::new(
            AuditAction::CompanyUpdated,
            Some(company.id),
            format!("Updated company '{}'", company.name),
            json!({ "fields": changed }),
            actor.id,
            &actor.email,
        ))
        .await?;

    Ok(ApiResponse::success(company))
}
