use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Administrative actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "audit_action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    StartImpersonation,
    EndImpersonation,
    CreditAdjustment,
    CompanyCreated,
    CompanyUpdated,
    UserCreated,
    UserUpdated,
}

/// Immutable record of an administrative action. Always attributed to the
/// real actor, never to an impersonated identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: AuditAction,
    pub entity_id: Option<Uuid>,
    pub description: String,
    pub metadata: serde_json::Value,
    pub actor_id: Uuid,
    pub actor_email: String,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        action: AuditAction,
        entity_id: Option<Uuid>,
        description: impl Into<String>,
        metadata: serde_json::Value,
        actor_id: Uuid,
        actor_email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            entity_id,
            description: description.into(),
            metadata,
            actor_id,
            actor_email: actor_email.into(),
            created_at: Utc::now(),
        }
    }
}
