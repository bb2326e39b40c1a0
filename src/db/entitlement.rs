use crate::models::FormPurchase;
use crate::services::EntitlementStore;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

/// Row of the `user_available_forms` function.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct AvailableForm {
    pub form_template_id: Uuid,
    pub has_access: bool,
}

pub async fn available_forms(pool: &PgPool, user_id: &str) -> Result<Vec<AvailableForm>, String> {
    let query_span = tracing::info_span!("Fetch available forms.");
    sqlx::query_as::<_, AvailableForm>(
        "SELECT form_template_id, has_access FROM user_available_forms($1)",
    )
    .bind(user_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch available forms, error: {:?}", err);
        "Could not fetch available forms".to_string()
    })
}

pub async fn is_available(pool: &PgPool, user_id: &str, form_id: Uuid) -> Result<bool, String> {
    let query_span = tracing::info_span!("Check form availability.");
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT COALESCE(
            (SELECT has_access FROM user_available_forms($1) WHERE form_template_id = $2),
            FALSE
        )
        "#,
    )
    .bind(user_id)
    .bind(form_id)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to check form availability, error: {:?}", err);
        "Could not check availability".to_string()
    })
}

pub struct PgEntitlementStore {
    pool: PgPool,
}

impl PgEntitlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementStore for PgEntitlementStore {
    async fn is_available(&self, user_id: &str, form_id: Uuid) -> Result<bool, String> {
        is_available(&self.pool, user_id, form_id).await
    }

    async fn completed_form_purchase(
        &self,
        user_id: &str,
        form_id: Uuid,
    ) -> Result<Option<FormPurchase>, String> {
        super::purchase::fetch_completed_for_form(&self.pool, user_id, form_id).await
    }

    async fn has_active_subscription(&self, user_id: &str) -> Result<bool, String> {
        super::subscription::has_active_form_access(&self.pool, user_id).await
    }

    async fn has_completed_bundle_purchase(
        &self,
        user_id: &str,
        containing: Option<Uuid>,
    ) -> Result<bool, String> {
        super::purchase::has_completed_bundle(&self.pool, user_id, containing).await
    }
}
