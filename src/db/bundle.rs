use crate::models;
use crate::services::BundleFormsSource;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn fetch_active(pool: &PgPool) -> Result<Vec<models::Bundle>, String> {
    let query_span = tracing::info_span!("Fetch active bundles.");
    sqlx::query_as::<_, models::Bundle>(
        r#"
        SELECT id, slug, name, description, price, is_active, created_at
        FROM bundles
        WHERE is_active
        ORDER BY price
        "#,
    )
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch bundles, error: {:?}", err);
        "Could not fetch bundles".to_string()
    })
}

pub async fn fetch_by_slug(pool: &PgPool, slug: &str) -> Result<Option<models::Bundle>, String> {
    let query_span = tracing::info_span!("Fetch bundle by slug.", slug);
    sqlx::query_as::<_, models::Bundle>(
        r#"
        SELECT id, slug, name, description, price, is_active, created_at
        FROM bundles
        WHERE slug = $1 AND is_active
        LIMIT 1
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch bundle, error: {:?}", err);
        "Could not fetch bundle".to_string()
    })
}

/// Bundle contents straight from Postgres.
pub struct PgBundleForms {
    pool: PgPool,
}

impl PgBundleForms {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BundleFormsSource for PgBundleForms {
    async fn forms_of(&self, bundle_id: Uuid) -> Result<Vec<models::FormTemplate>, String> {
        super::form_template::fetch_by_bundle(&self.pool, bundle_id).await
    }
}
