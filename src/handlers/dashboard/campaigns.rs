use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::resolver::EffectiveSession;
use crate::database::models::{Campaign, CampaignStatus, Role};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::tenant_scope;

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub body: String,
    pub template_id: Option<Uuid>,
    pub list_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub body: Option<String>,
    pub template_id: Option<Uuid>,
    pub list_id: Option<Uuid>,
    pub status: Option<CampaignStatus>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// GET /dashboard/campaigns
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
) -> ApiResult<Vec<Campaign>> {
    let company_id = tenant_scope(&session)?;
    let campaigns = state.store.list_campaigns(company_id).await?;
    Ok(ApiResponse::success(campaigns))
}

/// POST /dashboard/campaigns
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Json(payload): Json<CreateCampaignRequest>,
) -> ApiResult<Campaign> {
    let company_id = tenant_scope(&session)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("Campaign name is required"));
    }
    if payload.body.trim().is_empty() {
        return Err(ApiError::bad_request("Campaign body is required"));
    }

    // Referenced template/list must belong to the same company
    if let Some(template_id) = payload.template_id {
        state
            .store
            .template_by_id(company_id, template_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Template not found"))?;
    }
    if let Some(list_id) = payload.list_id {
        state
            .store
            .contact_list_by_id(company_id, list_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Contact list not found"))?;
    }

    let now = Utc::now();
    let campaign = Campaign {
        id: Uuid::new_v4(),
        company_id,
        name: payload.name.trim().to_string(),
        body: payload.body,
        template_id: payload.template_id,
        list_id: payload.list_id,
        status: if payload.scheduled_at.is_some() {
            CampaignStatus::Scheduled
        } else {
            CampaignStatus::Draft
        },
        scheduled_at: payload.scheduled_at,
        created_at: now,
        updated_at: now,
    };
    state.store.create_campaign(&campaign).await?;

    Ok(ApiResponse::created(campaign))
}

/// GET /dashboard/campaigns/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Campaign> {
    let company_id = tenant_scope(&session)?;
    let campaign = state
        .store
        .campaign_by_id(company_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Campaign not found"))?;
    Ok(ApiResponse::success(campaign))
}

/// PUT /dashboard/campaigns/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCampaignRequest>,
) -> ApiResult<Campaign> {
    let company_id = tenant_scope(&session)?;
    let mut campaign = state
        .store
        .campaign_by_id(company_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Campaign not found"))?;

    if campaign.status == CampaignStatus::Sent {
        return Err(ApiError::invalid_state("Sent campaigns cannot be edited"));
    }

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Campaign name cannot be empty"));
        }
        campaign.name = name.trim().to_string();
    }
    if let Some(body) = payload.body {
        campaign.body = body;
    }
    if let Some(template_id) = payload.template_id {
        state
            .store
            .template_by_id(company_id, template_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Template not found"))?;
        campaign.template_id = Some(template_id);
    }
    if let Some(list_id) = payload.list_id {
        state
            .store
            .contact_list_by_id(company_id, list_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Contact list not found"))?;
        campaign.list_id = Some(list_id);
    }
    if let Some(status) = payload.status {
        campaign.status = status;
    }
    if let Some(scheduled_at) = payload.scheduled_at {
        campaign.scheduled_at = Some(scheduled_at);
        if campaign.status == CampaignStatus::Draft {
            campaign.status = CampaignStatus::Scheduled;
        }
    }

    state.store.update_campaign(&campaign).await?;
    Ok(ApiResponse::success(campaign))
}

/// DELETE /dashboard/campaigns/:id - company admins only
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let company_id = tenant_scope(&session)?;
    if session.role != Role::CompanyAdmin {
        return Err(ApiError::forbidden("Only company admins can delete campaigns"));
    }

    state.store.delete_campaign(company_id, id).await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": id })))
}
