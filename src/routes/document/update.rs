use crate::db;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::views;
use actix_web::{put, web, Responder, Result};
use serde_valid::Validate;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Update document.", skip(pg_pool, user, form), fields(user = %user.id))]
#[put("/{id}")]
pub async fn update_handler(
    path: web::Path<(Uuid,)>,
    user: web::ReqData<Arc<models::User>>,
    form: web::Json<forms::DocumentUpdateForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<views::DocumentView>::build().form_error(errors.to_string()));
    }

    let id = path.into_inner().0;
    let mut document = super::owned_document(pg_pool.get_ref(), id, &user.id).await?;
    if document.status == models::DocumentStatus::Completed {
        return Err(JsonResponse::<views::DocumentView>::build()
            .conflict("Completed documents can not be changed"));
    }

    form.into_inner().update(&mut document);
    db::document::update(pg_pool.get_ref(), document)
        .await
        .map_err(|err| JsonResponse::<views::DocumentView>::build().internal_server_error(err))
        .and_then(|document| match document {
            Some(document) => Ok(JsonResponse::build()
                .set_item(views::DocumentView::from(document))
                .ok("Document saved")),
            None => Err(JsonResponse::<views::DocumentView>::build()
                .conflict("Completed documents can not be changed")),
        })
}
