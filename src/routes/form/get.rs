use crate::db;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{EntitlementResolver, EntitlementStore};
use crate::views;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "List form catalog.", skip(pg_pool))]
#[get("")]
pub async fn list_handler(
    query: web::Query<forms::CatalogQuery>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let filter = query.into_inner().into();
    db::form_template::fetch_active(pg_pool.get_ref(), &filter)
        .await
        .map(|templates| {
            let list = templates
                .iter()
                .map(Into::into)
                .collect::<Vec<views::FormSummary>>();
            JsonResponse::build().set_list(list).ok("OK")
        })
        .map_err(|err| JsonResponse::<views::FormSummary>::build().internal_server_error(err))
}

/// Forms the signed-in user may see, with the access flag from the
/// availability view. Anonymous callers get 401 so clients can prompt a login.
#[tracing::instrument(name = "List available forms.", skip(pg_pool, user))]
#[get("/available")]
pub async fn available_handler(
    user: Option<web::ReqData<Arc<models::User>>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let Some(user) = user else {
        return Err(JsonResponse::<db::entitlement::AvailableForm>::build()
            .unauthorized("Authentication required"));
    };
    db::entitlement::available_forms(pg_pool.get_ref(), &user.id)
        .await
        .map(|forms| JsonResponse::build().set_list(forms).ok("OK"))
        .map_err(|err| {
            JsonResponse::<db::entitlement::AvailableForm>::build().internal_server_error(err)
        })
}

#[tracing::instrument(name = "Get form detail.", skip(pg_pool, user, resolver))]
#[get("/{slug}")]
pub async fn item_handler(
    path: web::Path<(String,)>,
    user: Option<web::ReqData<Arc<models::User>>>,
    pg_pool: web::Data<PgPool>,
    resolver: web::Data<EntitlementResolver<dyn EntitlementStore>>,
) -> Result<impl Responder> {
    let slug = path.into_inner().0;
    let form = super::active_form(pg_pool.get_ref(), &slug).await?;
    let access = resolver
        .resolve(user.as_deref().map(|user| user.as_ref()), &form)
        .await;

    Ok(JsonResponse::build()
        .set_item(views::FormDetail::new(&form, access))
        .ok("OK"))
}
