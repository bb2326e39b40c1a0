use crate::db;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{EntitlementResolver, EntitlementStore};
use crate::views;
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;
use sqlx::PgPool;
use std::sync::Arc;

/// Save a new draft. The caller needs access to the underlying form.
#[tracing::instrument(name = "Add document.", skip(pg_pool, user, form, resolver), fields(user = %user.id))]
#[post("")]
pub async fn add_handler(
    user: web::ReqData<Arc<models::User>>,
    form: web::Json<forms::DocumentForm>,
    pg_pool: web::Data<PgPool>,
    resolver: web::Data<EntitlementResolver<dyn EntitlementStore>>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<views::DocumentView>::build().form_error(errors.to_string()));
    }

    let template = crate::routes::form::active_form(pg_pool.get_ref(), &form.form_slug).await?;
    let access = resolver.resolve(Some(user.as_ref()), &template).await;
    if !access.has_access {
        return Err(JsonResponse::<views::DocumentView>::build()
            .forbidden("No access to this form"));
    }

    let document = form.into_inner().into_document(&user.id, template.id);
    db::document::insert(pg_pool.get_ref(), document)
        .await
        .map(|document| {
            JsonResponse::build()
                .set_id(document.id)
                .set_item(views::DocumentView::from(document))
                .ok("Document saved")
        })
        .map_err(|err| JsonResponse::<views::DocumentView>::build().internal_server_error(err))
}
