//! Address lookup proxy. Keeps the upstream API key on the server.

use crate::connectors::{MapsConnector, Prediction, RateLimiter, StaticMapRequest};
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{get, web, Error, HttpResponse, Responder, Result};
use chrono::Utc;
use std::sync::Arc;

/// Upstream failures degrade to an empty list so typing never blocks.
#[tracing::instrument(name = "Autocomplete address.", skip(connector, user), fields(user = %user.id))]
#[get("/autocomplete")]
pub async fn autocomplete_handler(
    query: web::Query<forms::AutocompleteQuery>,
    user: web::ReqData<Arc<models::User>>,
    connector: web::Data<Arc<dyn MapsConnector>>,
) -> Result<impl Responder> {
    let input = query.input.trim();
    if input.is_empty() {
        return Ok(JsonResponse::<Prediction>::build().set_list(vec![]).ok("OK"));
    }

    let predictions = connector
        .autocomplete(input, query.session.as_deref())
        .await
        .unwrap_or_else(|err| {
            tracing::warn!("Autocomplete failed, returning no predictions: {}", err);
            vec![]
        });

    Ok(JsonResponse::build().set_list(predictions).ok("OK"))
}

#[tracing::instrument(name = "Get place details.", skip(connector, user), fields(user = %user.id))]
#[get("/place/{place_id}")]
pub async fn place_handler(
    path: web::Path<(String,)>,
    query: web::Query<forms::SessionQuery>,
    user: web::ReqData<Arc<models::User>>,
    connector: web::Data<Arc<dyn MapsConnector>>,
) -> Result<impl Responder> {
    let place_id = path.into_inner().0;
    connector
        .place_details(&place_id, query.session.as_deref())
        .await
        .map(|place| JsonResponse::build().set_item(place).ok("OK"))
        .map_err(Error::from)
}

/// Map image bytes, limited per user by a sliding window.
#[tracing::instrument(name = "Get static map.", skip(connector, limiter, user), fields(user = %user.id))]
#[get("/static")]
pub async fn static_map_handler(
    query: web::Query<StaticMapRequest>,
    user: web::ReqData<Arc<models::User>>,
    connector: web::Data<Arc<dyn MapsConnector>>,
    limiter: web::Data<Arc<dyn RateLimiter>>,
) -> Result<HttpResponse> {
    let decision = limiter.hit(&user.id, Utc::now()).await.map_err(Error::from)?;
    if !decision.allowed {
        tracing::info!(retry_after = decision.retry_after_secs, "static map rate limit hit");
        return Err(JsonResponse::<String>::build()
            .too_many_requests_after("Too many map requests", decision.retry_after_secs));
    }

    let image = connector
        .static_map(query.into_inner().normalized())
        .await
        .map_err(Error::from)?;

    Ok(HttpResponse::Ok()
        .content_type(image.content_type)
        .insert_header(("X-RateLimit-Remaining", decision.remaining.to_string()))
        .body(image.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::maps_service::mock::{MockMapsConnector, PLACEHOLDER_PNG};
    use crate::connectors::{MemoryRateLimiter, RateLimitConfig};
    use actix_web::{test, App, HttpMessage};
    use serde_json::Value;

    fn user() -> Arc<models::User> {
        Arc::new(models::User {
            id: "user-42".to_string(),
            role: "group_user".to_string(),
            ..Default::default()
        })
    }

    #[actix_web::test]
    async fn static_map_is_limited_per_user() {
        let connector: Arc<dyn MapsConnector> = Arc::new(MockMapsConnector::default());
        let limiter: Arc<dyn RateLimiter> = Arc::new(MemoryRateLimiter::new(&RateLimitConfig {
            max_requests: 2,
            window_secs: 3600,
        }));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(connector))
                .app_data(web::Data::new(limiter))
                .service(static_map_handler),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::get().uri("/static?lat=52.52&lng=13.40").to_request();
            req.extensions_mut().insert(user());
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 200);
            assert_eq!(test::read_body(resp).await.as_ref(), PLACEHOLDER_PNG);
        }

        let req = test::TestRequest::get().uri("/static?lat=52.52&lng=13.40").to_request();
        req.extensions_mut().insert(user());
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 429);
        assert!(resp.headers().contains_key("retry-after"));
    }

    #[actix_web::test]
    async fn autocomplete_returns_german_addresses() {
        let connector: Arc<dyn MapsConnector> = Arc::new(MockMapsConnector::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(connector))
                .service(autocomplete_handler),
        )
        .await;

        let req = test::TestRequest::get().uri("/autocomplete?input=Jungfern").to_request();
        req.extensions_mut().insert(user());
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let list = body["list"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0]["description"].as_str().unwrap().contains("Hamburg"));
    }
}
