use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

/// Subscriptions of a user with the product code of each app joined in.
pub async fn fetch_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<models::UserSubscription>, String> {
    let query_span = tracing::info_span!("Fetch subscriptions by user id.");
    sqlx::query_as::<_, models::UserSubscription>(
        r#"
        SELECT s.id, s.user_id, s.product_id, p.code AS product_code, s.plan_code,
               s.status, s.current_period_end, s.created_at
        FROM user_subscriptions s
        JOIN products p ON p.id = s.product_id
        WHERE s.user_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch subscriptions, error: {:?}", err);
        "Could not fetch subscriptions".to_string()
    })
}

/// Active, unexpired subscription to a product that unlocks the form catalog.
pub async fn has_active_form_access(pool: &PgPool, user_id: &str) -> Result<bool, String> {
    let query_span = tracing::info_span!("Check active subscription.");
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM user_subscriptions s
            JOIN products p ON p.id = s.product_id
            WHERE s.user_id = $1
              AND s.status = 'active'
              AND p.grants_form_access
              AND (s.current_period_end IS NULL OR s.current_period_end > NOW())
        )
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to check subscription, error: {:?}", err);
        "Could not check subscription".to_string()
    })
}
