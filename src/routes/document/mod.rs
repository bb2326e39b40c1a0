pub mod add;
pub mod complete;
pub mod delete;
pub mod get;
pub mod update;

pub use add::*;
pub use complete::*;
pub use delete::*;
pub use get::*;
pub use update::*;

use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::Error;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) async fn owned_document(
    pool: &PgPool,
    id: Uuid,
    user_id: &str,
) -> Result<models::GeneratedDocument, Error> {
    db::document::fetch(pool, id, user_id)
        .await
        .map_err(|err| JsonResponse::<models::GeneratedDocument>::build().internal_server_error(err))
        .and_then(|document| match document {
            Some(document) => Ok(document),
            None => Err(JsonResponse::<models::GeneratedDocument>::build().not_found("Document not found")),
        })
}

pub(crate) async fn document_template(
    pool: &PgPool,
    document: &models::GeneratedDocument,
) -> Result<models::FormTemplate, Error> {
    db::form_template::fetch(pool, document.form_template_id)
        .await
        .map_err(|err| JsonResponse::<models::FormTemplate>::build().internal_server_error(err))
        .and_then(|form| {
            form.ok_or_else(|| JsonResponse::<models::FormTemplate>::build().not_found("Form not found"))
        })
}

pub(crate) fn data_map(document: &models::GeneratedDocument) -> Map<String, Value> {
    document.data.as_object().cloned().unwrap_or_default()
}
