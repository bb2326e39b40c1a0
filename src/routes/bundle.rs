use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{price_bundle, price_bundles};
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "List bundles with pricing.", skip(pg_pool))]
#[get("")]
pub async fn list_handler(pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    let bundles = db::bundle::fetch_active(pg_pool.get_ref())
        .await
        .map_err(|err| JsonResponse::<models::BundlePricing>::build().internal_server_error(err))?;

    let source = db::bundle::PgBundleForms::new(pg_pool.get_ref().clone());
    price_bundles(&source, bundles)
        .await
        .map(|priced| JsonResponse::build().set_list(priced).ok("OK"))
        .map_err(|err| JsonResponse::<models::BundlePricing>::build().internal_server_error(err))
}

#[tracing::instrument(name = "Get bundle.", skip(pg_pool))]
#[get("/{slug}")]
pub async fn item_handler(
    path: web::Path<(String,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let slug = path.into_inner().0;
    let bundle = db::bundle::fetch_by_slug(pg_pool.get_ref(), &slug)
        .await
        .map_err(|err| JsonResponse::<models::BundlePricing>::build().internal_server_error(err))
        .and_then(|bundle| match bundle {
            Some(bundle) if bundle.is_active => Ok(bundle),
            _ => Err(JsonResponse::<models::BundlePricing>::build().not_found("Bundle not found")),
        })?;

    let forms = db::form_template::fetch_by_bundle(pg_pool.get_ref(), bundle.id)
        .await
        .map_err(|err| JsonResponse::<models::BundlePricing>::build().internal_server_error(err))?;

    Ok(JsonResponse::build()
        .set_item(price_bundle(bundle, forms))
        .ok("OK"))
}
