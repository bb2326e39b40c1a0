use crate::forms;
use crate::helpers::JsonResponse;
use crate::views;
use crate::wizard;
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;

/// Validate wizard data against a template. With `step` set only that
/// step's fields are checked; the summary always covers the whole form.
#[tracing::instrument(name = "Validate form data.", skip(pg_pool, form))]
#[post("/{slug}/validate")]
pub async fn validate_handler(
    path: web::Path<(String,)>,
    form: web::Json<forms::ValidateDataForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let slug = path.into_inner().0;
    let template = super::active_form(pg_pool.get_ref(), &slug).await?;
    let form = form.into_inner();

    let errors = match form.step {
        Some(step) if step >= template.steps().len() => {
            return Err(JsonResponse::<views::CompletionView>::build()
                .bad_request(format!("Form has no step {}", step)));
        }
        Some(step) => wizard::schema::validate_step(&template, step, &form.data),
        None => wizard::validate(&template, &form.data),
    };
    let summary = wizard::build_summary(&template, &form.data);

    Ok(JsonResponse::build()
        .set_item(views::CompletionView { summary, errors })
        .ok("OK"))
}
