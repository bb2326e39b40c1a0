use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::FormTemplate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct Bundle {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// A bundle together with its forms and the savings against buying them one by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BundlePricing {
    pub bundle: Bundle,
    pub forms: Vec<FormTemplate>,
    pub individual_total: f64,
    pub savings: f64,
    pub savings_percent: f64,
}
