use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only ledger row. `balance_after` snapshots the company balance at
/// the moment the delta was applied; the pair is written atomically.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub company_id: Uuid,
    pub delta: i64,
    pub balance_after: i64,
    pub reason: String,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
