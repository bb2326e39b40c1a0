use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sibling app of the product suite (the target of cross-sell banners).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub code: String, // app code, unique: mietrecht | nebenkosten | kaution ...
    pub name: String,
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
