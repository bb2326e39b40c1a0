use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{EntitlementResolver, EntitlementStore};
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Check form access.", skip(pg_pool, user, resolver))]
#[get("/{slug}/access")]
pub async fn access_handler(
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

    Ok(JsonResponse::build().set_item(access).ok("OK"))
}
