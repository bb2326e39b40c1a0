use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::render_document;
use crate::views;
use crate::wizard;
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Finish a draft: every required field must be filled. The body is
/// rendered once and stored with the document.
#[tracing::instrument(name = "Complete document.", skip(pg_pool, user), fields(user = %user.id))]
#[post("/{id}/complete")]
pub async fn complete_handler(
    path: web::Path<(Uuid,)>,
    user: web::ReqData<Arc<models::User>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let id = path.into_inner().0;
    let document = super::owned_document(pg_pool.get_ref(), id, &user.id).await?;
    if document.status == models::DocumentStatus::Completed {
        return Err(JsonResponse::<views::CompletionView>::build()
            .conflict("Document is already completed"));
    }

    let template = super::document_template(pg_pool.get_ref(), &document).await?;
    let data = super::data_map(&document);
    let summary = wizard::build_summary(&template, &data);
    if !summary.all_complete {
        let errors = wizard::validate(&template, &data);
        return Err(JsonResponse::build()
            .set_item(views::CompletionView { summary, errors })
            .bad_request("Required fields are missing"));
    }

    let text = render_document(&template, &document.title, &data).map_err(|err| {
        tracing::error!("Failed to render document {}: {:?}", id, err);
        JsonResponse::<views::DocumentView>::build().internal_server_error("Failed to render document")
    })?;

    db::document::complete(pg_pool.get_ref(), id, &user.id, &text)
        .await
        .map_err(|err| JsonResponse::<views::DocumentView>::build().internal_server_error(err))
        .and_then(|document| match document {
            Some(document) => Ok(JsonResponse::build()
                .set_item(views::DocumentView::from(document))
                .ok("Document completed")),
            None => Err(JsonResponse::<views::DocumentView>::build().not_found("Document not found")),
        })
}
