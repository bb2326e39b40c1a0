use crate::models;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn fetch_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<models::FormPurchase>, String> {
    let query_span = tracing::info_span!("Fetch purchases by user id.");
    sqlx::query_as::<_, models::FormPurchase>(
        r#"
        SELECT id, user_id, form_template_id, bundle_id, status, amount, purchased_at
        FROM form_purchases
        WHERE user_id = $1
        ORDER BY purchased_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch purchases, error: {:?}", err);
        "Could not fetch purchases".to_string()
    })
}

/// Completed purchase of a single form, preferring direct purchases over bundle grants.
pub async fn fetch_completed_for_form(
    pool: &PgPool,
    user_id: &str,
    form_id: Uuid,
) -> Result<Option<models::FormPurchase>, String> {
    let query_span = tracing::info_span!("Fetch completed form purchase.");
    sqlx::query_as::<_, models::FormPurchase>(
        r#"
        SELECT id, user_id, form_template_id, bundle_id, status, amount, purchased_at
        FROM form_purchases
        WHERE user_id = $1 AND form_template_id = $2 AND status = 'completed'
        ORDER BY (bundle_id IS NOT NULL), purchased_at
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(form_id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch form purchase, error: {:?}", err);
        "Could not fetch purchase".to_string()
    })
}

/// Any completed bundle purchase, optionally limited to bundles containing `form_id`.
pub async fn has_completed_bundle(
    pool: &PgPool,
    user_id: &str,
    form_id: Option<Uuid>,
) -> Result<bool, String> {
    let query_span = tracing::info_span!("Check completed bundle purchase.");
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM form_purchases p
            WHERE p.user_id = $1
              AND p.status = 'completed'
              AND p.bundle_id IS NOT NULL
              AND p.form_template_id IS NULL
              AND (
                $2::uuid IS NULL
                OR EXISTS (
                    SELECT 1 FROM bundle_form_templates bft
                    WHERE bft.bundle_id = p.bundle_id AND bft.form_template_id = $2
                )
              )
        )
        "#,
    )
    .bind(user_id)
    .bind(form_id)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to check bundle purchase, error: {:?}", err);
        "Could not check bundle purchase".to_string()
    })
}
