use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{get, web, Responder, Result};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

/// Current subscription state, polled by clients to refresh gated UI.
#[tracing::instrument(name = "Get subscription status.", skip(pg_pool, user), fields(user = %user.id))]
#[get("")]
pub async fn status_handler(
    user: web::ReqData<Arc<models::User>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    db::subscription::fetch_by_user(pg_pool.get_ref(), &user.id)
        .await
        .map(|subscriptions| {
            let status = models::SubscriptionStatusView::from_subscriptions(&subscriptions, Utc::now());
            JsonResponse::build().set_item(status).ok("OK")
        })
        .map_err(|err| {
            JsonResponse::<models::SubscriptionStatusView>::build().internal_server_error(err)
        })
}
