use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<models::Product>, String> {
    let query_span = tracing::info_span!("Fetch products.");
    sqlx::query_as::<_, models::Product>(
        "SELECT id, code, name, url, created_at FROM products ORDER BY code",
    )
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch products, error: {:?}", err);
        "Could not fetch products".to_string()
    })
}
