use crate::models;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

const COLUMNS: &str = r#"
    id, user_id, form_template_id, title, data, status, pdf_url,
    rendered_text, created_at, updated_at
"#;

pub async fn fetch(
    pool: &PgPool,
    id: Uuid,
    user_id: &str,
) -> Result<Option<models::GeneratedDocument>, String> {
    tracing::info!("Fetch document {}", id);
    let sql = format!("SELECT {COLUMNS} FROM generated_documents WHERE id = $1 AND user_id = $2 LIMIT 1");
    sqlx::query_as::<_, models::GeneratedDocument>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch document, error: {:?}", err);
            "Could not fetch data".to_string()
        })
}

pub async fn fetch_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<models::GeneratedDocument>, String> {
    let query_span = tracing::info_span!("Fetch documents by user id.");
    let sql = format!(
        "SELECT {COLUMNS} FROM generated_documents WHERE user_id = $1 ORDER BY updated_at DESC"
    );
    sqlx::query_as::<_, models::GeneratedDocument>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch documents, error: {:?}", err);
            "Could not fetch data".to_string()
        })
}

pub async fn insert(
    pool: &PgPool,
    document: models::GeneratedDocument,
) -> Result<models::GeneratedDocument, String> {
    let query_span = tracing::info_span!("Saving new document into the database");
    let sql = format!(
        r#"
        INSERT INTO generated_documents (user_id, form_template_id, title, data, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, models::GeneratedDocument>(&sql)
        .bind(&document.user_id)
        .bind(document.form_template_id)
        .bind(&document.title)
        .bind(&document.data)
        .bind(document.status)
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to insert document: {:?}", err);
            "Failed to insert".to_string()
        })
}

/// Update title and data of a draft. Completed documents are left untouched.
pub async fn update(
    pool: &PgPool,
    document: models::GeneratedDocument,
) -> Result<Option<models::GeneratedDocument>, String> {
    let query_span = tracing::info_span!("Updating document");
    let sql = format!(
        r#"
        UPDATE generated_documents
        SET title = $3, data = $4, updated_at = NOW()
        WHERE id = $1 AND user_id = $2 AND status = 'draft'
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, models::GeneratedDocument>(&sql)
        .bind(document.id)
        .bind(&document.user_id)
        .bind(&document.title)
        .bind(&document.data)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to update document: {:?}", err);
            "Failed to update".to_string()
        })
}

pub async fn complete(
    pool: &PgPool,
    id: Uuid,
    user_id: &str,
    rendered_text: &str,
) -> Result<Option<models::GeneratedDocument>, String> {
    let query_span = tracing::info_span!("Completing document");
    let sql = format!(
        r#"
        UPDATE generated_documents
        SET status = 'completed', rendered_text = $3, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, models::GeneratedDocument>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(rendered_text)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to complete document: {:?}", err);
            "Failed to complete".to_string()
        })
}

/// Returns whether a row was deleted.
pub async fn delete(pool: &PgPool, id: Uuid, user_id: &str) -> Result<bool, String> {
    let query_span = tracing::info_span!("Deleting document");
    sqlx::query("DELETE FROM generated_documents WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Failed to delete document: {:?}", err);
            "Failed to delete".to_string()
        })
}
