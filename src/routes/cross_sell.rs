use crate::configuration::Settings;
use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::cross_sell::{with_product_links, without_owned};
use actix_web::{get, web, Responder, Result};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;

/// Active triggers of a source app, highest priority first. Apps the caller
/// already subscribes to are left out. Dismissals live on the client; `meta`
/// carries how many days they last.
#[tracing::instrument(name = "List cross-sell triggers.", skip(pg_pool, user, settings))]
#[get("/{source_app}")]
pub async fn list_handler(
    path: web::Path<(String,)>,
    user: Option<web::ReqData<Arc<models::User>>>,
    pg_pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> Result<impl Responder> {
    let source_app = path.into_inner().0;
    let triggers = db::cross_sell::fetch_active_by_source(pg_pool.get_ref(), &source_app)
        .await
        .map_err(|err| JsonResponse::<models::CrossSellTrigger>::build().internal_server_error(err))?;

    let triggers = match user {
        Some(user) => {
            let owned = owned_apps(pg_pool.get_ref(), &user.id).await;
            without_owned(triggers, &owned)
        }
        None => triggers,
    };

    let triggers = match db::product::fetch_all(pg_pool.get_ref()).await {
        Ok(products) => with_product_links(triggers, &products),
        Err(_) => triggers,
    };

    Ok(JsonResponse::build()
        .set_list(triggers)
        .set_meta(json!({ "dismissal_ttl_days": settings.cross_sell.dismissal_ttl_days }))
        .ok("OK"))
}

/// Failing lookups leave the set empty.
async fn owned_apps(pool: &PgPool, user_id: &str) -> HashSet<String> {
    match db::subscription::fetch_by_user(pool, user_id).await {
        Ok(subscriptions) => {
            models::SubscriptionStatusView::from_subscriptions(&subscriptions, Utc::now())
                .owned_apps
                .into_iter()
                .collect()
        }
        Err(_) => HashSet::new(),
    }
}
