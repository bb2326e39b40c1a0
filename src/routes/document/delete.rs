use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{delete, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Delete document.", skip(pg_pool, user), fields(user = %user.id))]
#[delete("/{id}")]
pub async fn delete_handler(
    path: web::Path<(Uuid,)>,
    user: web::ReqData<Arc<models::User>>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let id = path.into_inner().0;
    db::document::delete(pg_pool.get_ref(), id, &user.id)
        .await
        .map_err(|err| JsonResponse::<String>::build().internal_server_error(err))
        .and_then(|deleted| match deleted {
            true => Ok(JsonResponse::<String>::build().set_id(id).ok("Deleted")),
            false => Err(JsonResponse::<String>::build().not_found("Document not found")),
        })
}
