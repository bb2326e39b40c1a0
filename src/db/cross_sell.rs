use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

pub async fn fetch_active_by_source(
    pool: &PgPool,
    source_app: &str,
) -> Result<Vec<models::CrossSellTrigger>, String> {
    let query_span = tracing::info_span!("Fetch cross-sell triggers.", source_app);
    sqlx::query_as::<_, models::CrossSellTrigger>(
        r#"
        SELECT id, source_app, target_app, trigger_type, priority, headline, message,
               cta_text, cta_url, is_active, created_at
        FROM ai_cross_sell_triggers
        WHERE source_app = $1 AND is_active
        ORDER BY priority DESC, id
        "#,
    )
    .bind(source_app)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch cross-sell triggers, error: {:?}", err);
        "Could not fetch cross-sell triggers".to_string()
    })
}
