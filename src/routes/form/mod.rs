pub mod access;
pub mod get;
pub mod validate;

pub use access::*;
pub use get::*;
pub use validate::*;

use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::Error;
use sqlx::PgPool;

pub(crate) async fn active_form(pool: &PgPool, slug: &str) -> Result<models::FormTemplate, Error> {
    db::form_template::fetch_by_slug(pool, slug)
        .await
        .map_err(|err| JsonResponse::<models::FormTemplate>::build().internal_server_error(err))
        .and_then(|form| match form {
            Some(form) if form.is_active => Ok(form),
            _ => Err(JsonResponse::<models::FormTemplate>::build().not_found("Form not found")),
        })
}
