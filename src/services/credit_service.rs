use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Account, AuditAction, AuditEntry, CreditTransaction};
use crate::database::store::{AuditSink, DataStore};
use crate::error::ApiError;

/// Credit-ledger bookkeeping. Every adjustment is one atomic balance update
/// plus ledger row (the store owns that pairing) and one audit entry.
pub struct CreditService {
    store: Arc<dyn DataStore>,
    audit: Arc<dyn AuditSink>,
}

impl CreditService {
    pub fn new(store: Arc<dyn DataStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    pub async fn adjust(
        &self,
        actor: &Account,
        company_id: Uuid,
        delta: i64,
        reason: &str,
    ) -> Result<CreditTransaction, ApiError> {
        if delta == 0 {
            return Err(ApiError::bad_request("Credit adjustment must be non-zero"));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ApiError::bad_request("A reason is required for credit adjustments"));
        }

        let transaction = self
            .store
            .adjust_credits(company_id, delta, reason, Some(actor.id))
            .await?;

        self.audit
            .append(&AuditEntry::new(
                AuditAction::CreditAdjustment,
                Some(company_id),
                format!("Adjusted credits by {} ({})", delta, reason),
                json!({
                    "delta": delta,
                    "balance_after": transaction.balance_after,
                    "reason": reason,
                }),
                actor.id,
                &actor.email,
            ))
            .await?;

        tracing::info!(
            "Credit adjustment of {} for company {} by {} (balance now {})",
            delta,
            company_id,
            actor.email,
            transaction.balance_after
        );

        Ok(transaction)
    }
}
