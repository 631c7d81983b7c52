use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactList {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A phone number enrolled in a contact list. `subscribed` is the opt-in
/// flag; unsubscribed members stay on the list for audit purposes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactMember {
    pub id: Uuid,
    pub list_id: Uuid,
    pub phone: String,
    pub name: Option<String>,
    pub subscribed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
