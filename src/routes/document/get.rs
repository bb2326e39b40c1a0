use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use crate::views;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "List documents.", skip(pg_pool, user), fields(user = %user.id))]
#[get("")]
pub async fn list_handler(
    user: web::ReqData<Arc<models::User>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    db::document::fetch_by_user(pg_pool.get_ref(), &user.id)
        .await
        .map(|documents| {
            let list = documents
                .into_iter()
                .map(Into::into)
                .collect::<Vec<views::DocumentView>>();
            JsonResponse::build().set_list(list).ok("OK")
        })
        .map_err(|err| JsonResponse::<views::DocumentView>::build().internal_server_error(err))
}

#[tracing::instrument(name = "Get document.", skip(pg_pool, user), fields(user = %user.id))]
#[get("/{id}")]
pub async fn item_handler(
    path: web::Path<(Uuid,)>,
    user: web::ReqData<Arc<models::User>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let id = path.into_inner().0;
    let document = super::owned_document(pg_pool.get_ref(), id, &user.id).await?;

    Ok(JsonResponse::build()
        .set_item(views::DocumentView::from(document))
        .ok("OK"))
}

/// Stored text of a completed document, or a preview of a draft.
#[tracing::instrument(name = "Render document.", skip(pg_pool, user), fields(user = %user.id))]
#[get("/{id}/render")]
pub async fn render_handler(
    path: web::Path<(Uuid,)>,
    user: web::ReqData<Arc<models::User>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let id = path.into_inner().0;
    let document = super::owned_document(pg_pool.get_ref(), id, &user.id).await?;

    let text = match document.rendered_text.clone() {
        Some(text) if document.status == models::DocumentStatus::Completed => text,
        _ => {
            let template = super::document_template(pg_pool.get_ref(), &document).await?;
            crate::services::render_document(&template, &document.title, &super::data_map(&document))
                .map_err(|err| {
                    tracing::error!("Failed to render document {}: {:?}", document.id, err);
                    JsonResponse::<views::RenderedView>::build()
                        .internal_server_error("Failed to render document")
                })?
        }
    };

    Ok(JsonResponse::build()
        .set_item(views::RenderedView {
            id: document.id,
            title: document.title,
            status: document.status,
            text,
        })
        .ok("OK"))
}
