use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(rename_all = "lowercase", type_name = "varchar")]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    #[default]
    Pending,
    Completed,
    Refunded,
}

/// Entitlement record for a single form or a whole bundle.
///
/// Rows carrying both `form_template_id` and `bundle_id` were granted through a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct FormPurchase {
    pub id: Uuid,
    pub user_id: String,
    pub form_template_id: Option<Uuid>,
    pub bundle_id: Option<Uuid>,
    pub status: PurchaseStatus,
    pub amount: f64,
    pub purchased_at: Option<DateTime<Utc>>,
}

impl FormPurchase {
    pub fn is_completed(&self) -> bool {
        self.status == PurchaseStatus::Completed
    }

    pub fn from_bundle(&self) -> bool {
        self.bundle_id.is_some()
    }
}
