use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(rename_all = "snake_case", type_name = "varchar")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Canceled,
    PastDue,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct UserSubscription {
    pub id: Uuid,
    pub user_id: String,
    pub product_id: Uuid,
    /// Code of the product (app) the subscription belongs to, joined from `products`.
    pub product_code: String,
    pub plan_code: String,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl UserSubscription {
    /// Active and not past its billing period.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active
            && self.current_period_end.map_or(true, |end| end > now)
    }
}

/// Snapshot returned to clients that poll their subscription status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubscriptionStatusView {
    pub active: bool,
    pub plan_code: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub owned_apps: Vec<String>,
}

impl SubscriptionStatusView {
    pub fn from_subscriptions(subscriptions: &[UserSubscription], now: DateTime<Utc>) -> Self {
        let active: Vec<&UserSubscription> = subscriptions
            .iter()
            .filter(|subscription| subscription.is_active_at(now))
            .collect();

        let mut owned_apps: Vec<String> = active
            .iter()
            .map(|subscription| subscription.product_code.clone())
            .collect();
        owned_apps.sort();
        owned_apps.dedup();

        let latest = active
            .iter()
            .max_by_key(|subscription| subscription.current_period_end);

        Self {
            active: !active.is_empty(),
            plan_code: latest.map(|subscription| subscription.plan_code.clone()),
            current_period_end: latest.and_then(|subscription| subscription.current_period_end),
            owned_apps,
        }
    }
}
