use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct CrossSellTrigger {
    pub id: Uuid,
    pub source_app: String,
    pub target_app: String,
    /// e.g. `document_completed`, `form_viewed`, `calculator_used`
    pub trigger_type: String,
    pub priority: i32,
    pub headline: String,
    pub message: String,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Locally persisted dismissal of a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dismissal {
    pub trigger_id: Uuid,
    pub dismissed_at: DateTime<Utc>,
}
