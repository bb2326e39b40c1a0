use crate::models::{self, Persona, Tier};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

const COLUMNS: &str = r#"
    id, slug, name, description, category, persona, tier, price, steps,
    body_template, is_active, sort_order, created_at, updated_at
"#;

/// Optional catalog filters, all combined with AND.
#[derive(Debug, Default, Clone)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub persona: Option<Persona>,
    pub tier: Option<Tier>,
}

pub async fn fetch_active(
    pool: &PgPool,
    filter: &CatalogFilter,
) -> Result<Vec<models::FormTemplate>, String> {
    let query_span = tracing::info_span!("Fetch active form templates.");
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM form_templates
        WHERE is_active
          AND ($1::varchar IS NULL OR category = $1)
          AND ($2::varchar IS NULL OR persona = $2 OR persona = 'both')
          AND ($3::varchar IS NULL OR tier = $3)
        ORDER BY sort_order, name
        "#
    );
    sqlx::query_as::<_, models::FormTemplate>(&sql)
        .bind(filter.category.as_deref())
        .bind(filter.persona)
        .bind(filter.tier)
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch form templates, error: {:?}", err);
            "Could not fetch form templates".to_string()
        })
}

pub async fn fetch_by_slug(pool: &PgPool, slug: &str) -> Result<Option<models::FormTemplate>, String> {
    let query_span = tracing::info_span!("Fetch form template by slug.", slug);
    let sql = format!("SELECT {COLUMNS} FROM form_templates WHERE slug = $1 AND is_active LIMIT 1");
    sqlx::query_as::<_, models::FormTemplate>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch form template, error: {:?}", err);
            "Could not fetch form template".to_string()
        })
}

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<models::FormTemplate>, String> {
    let query_span = tracing::info_span!("Fetch form template by id.");
    let sql = format!("SELECT {COLUMNS} FROM form_templates WHERE id = $1 LIMIT 1");
    sqlx::query_as::<_, models::FormTemplate>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch form template {}, error: {:?}", id, err);
            "Could not fetch form template".to_string()
        })
}

/// Forms contained in a bundle, in catalog order.
pub async fn fetch_by_bundle(
    pool: &PgPool,
    bundle_id: Uuid,
) -> Result<Vec<models::FormTemplate>, String> {
    let query_span = tracing::info_span!("Fetch form templates of bundle.");
    let sql = format!(
        r#"
        SELECT {}
        FROM form_templates f
        JOIN bundle_form_templates bft ON bft.form_template_id = f.id
        WHERE bft.bundle_id = $1
        ORDER BY f.sort_order, f.name
        "#,
        COLUMNS
            .split(',')
            .map(|column| format!("f.{}", column.trim()))
            .collect::<Vec<_>>()
            .join(", ")
    );
    sqlx::query_as::<_, models::FormTemplate>(&sql)
        .bind(bundle_id)
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch bundle forms, error: {:?}", err);
            "Could not fetch bundle forms".to_string()
        })
}
