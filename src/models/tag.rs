use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub label: String,
    pub created_at: String,
}

impl Tag {
    /// Labels are stored exactly as given: case is significant and only the
    /// caller's edge trimming applies.
    pub fn new(label: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EntryTag {
    pub entry_id: String,
    pub tag_id: String,
}
