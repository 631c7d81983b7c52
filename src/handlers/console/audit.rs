use axum::extract::{Query, State};
use serde::Deserialize;

use crate::database::models::AuditEntry;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

/// GET /admin/audit[?limit=N] - Most recent administrative actions
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Vec<AuditEntry>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    Ok(ApiResponse::success(state.audit.recent(limit).await?))
}
