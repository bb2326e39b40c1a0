use crate::forms::PasswordCheckForm;
use crate::helpers::validation;
use crate::helpers::JsonResponse;
use crate::views::calculator::{FieldCheck, PasswordCheck};
use actix_web::{get, post, web, Responder, Result};

#[tracing::instrument(name = "Validate IBAN.", skip(path))]
#[get("/iban/{iban}")]
pub async fn iban_handler(path: web::Path<(String,)>) -> Result<impl Responder> {
    let input = path.into_inner().0;
    let valid = validation::is_valid_german_iban(&input);
    let formatted = valid.then(|| validation::format_iban(&input));

    Ok(JsonResponse::build()
        .set_item(FieldCheck { input, valid, formatted })
        .ok("OK"))
}

#[tracing::instrument(name = "Validate PLZ.")]
#[get("/plz/{plz}")]
pub async fn plz_handler(path: web::Path<(String,)>) -> Result<impl Responder> {
    let input = path.into_inner().0;
    let valid = validation::is_valid_plz(&input);

    Ok(JsonResponse::build()
        .set_item(FieldCheck { input, valid, formatted: None })
        .ok("OK"))
}

/// The password travels in the body so it stays out of access logs.
#[tracing::instrument(name = "Check password policy.", skip(form))]
#[post("/password")]
pub async fn password_handler(form: web::Json<PasswordCheckForm>) -> Result<impl Responder> {
    let violations = validation::password_policy_violations(&form.password);

    Ok(JsonResponse::build()
        .set_item(PasswordCheck {
            valid: violations.is_empty(),
            violations,
        })
        .ok("OK"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn iban_is_checked_and_grouped() {
        let app = test::init_service(App::new().service(iban_handler)).await;
        let req = test::TestRequest::get()
            .uri("/iban/DE89370400440532013000")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["item"]["valid"], true);
        assert_eq!(body["item"]["formatted"], "DE89 3704 0044 0532 0130 00");
    }

    #[actix_web::test]
    async fn short_plz_is_invalid() {
        let app = test::init_service(App::new().service(plz_handler)).await;
        let req = test::TestRequest::get().uri("/plz/1011").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["item"]["valid"], false);
    }

    #[actix_web::test]
    async fn weak_password_lists_the_broken_rules() {
        let app = test::init_service(App::new().service(password_handler)).await;
        let req = test::TestRequest::post()
            .uri("/password")
            .set_json(serde_json::json!({"password": "kurz"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["item"]["valid"], false);
        assert_eq!(body["item"]["violations"].as_array().map(Vec::len), Some(3));
    }
}
