use axum::{extract::State, Extension};
use serde_json::json;

use crate::auth::resolver::EffectiveSession;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::tenant_scope;

/// GET /dashboard/credits - Own company balance and recent ledger rows.
/// Adjustments happen in the console; the dashboard view is read-only.
pub async fn overview(
    State(state): State<AppState>,
    Extension(session): Extension<EffectiveSession>,
) -> ApiResult<serde_json::Value> {
    let company_id = tenant_scope(&session)?;

    let company = state
        .store
        .company_by_id(company_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;
    let transactions = state.store.list_credit_transactions(company_id, 50).await?;

    Ok(ApiResponse::success(json!({
        "balance": company.credit_balance,
        "transactions": transactions,
    })))
}
