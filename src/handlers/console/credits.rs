use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Account, CreditTransaction};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CreditService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdjustCreditsRequest {
    pub company_id: Uuid,
    pub delta: i64,
    pub reason: String,
}

/// POST /admin/credits - Adjust a company's credit balance
///
/// Writes the atomic balance-update/ledger pair and an audit entry
/// attributed to the acting admin.
pub async fn adjust(
    State(state): State<AppState>,
    Extension(actor): Extension<Account>,
    Json(payload): Json<AdjustCreditsRequest>,
) -> ApiResult<CreditTransaction> {
    let service = CreditService::new(state.store.clone(), state.audit.clone());
    let transaction = service
        .adjust(&actor, payload.company_id, payload.delta, &payload.reason)
        .await?;
    Ok(ApiResponse::success(transaction))
}
