use crate::helpers::JsonResponse;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Health check.", skip(pg_pool))]
#[get("")]
pub async fn health_check(pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pg_pool.get_ref())
        .await
        .map(|_| JsonResponse::<String>::build().ok("OK"))
        .map_err(|err| {
            tracing::error!("Database is not reachable: {:?}", err);
            JsonResponse::<String>::build().internal_server_error("Database is not reachable")
        })
}
