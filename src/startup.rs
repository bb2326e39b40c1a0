use crate::configuration::Settings;
use crate::connectors;
use crate::db;
use crate::middleware;
use crate::routes;
use crate::services::{EntitlementResolver, EntitlementStore};
use actix_cors::Cors;
use actix_web::{dev::Server, error, http, web, App, HttpServer};
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

pub async fn run(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let oauth_http_client = reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    let oauth_http_client = web::Data::new(oauth_http_client);

    let oauth_cache = web::Data::new(middleware::authentication::OAuthCache::new(
        Duration::from_secs(60),
    ));

    let entitlement_store: Arc<dyn EntitlementStore> =
        Arc::new(db::entitlement::PgEntitlementStore::new(pg_pool.clone()));
    let entitlement_resolver = web::Data::new(EntitlementResolver::<dyn EntitlementStore>::new(
        entitlement_store,
        settings.entitlements.bundle_scope,
    ));

    let maps_connector = connectors::init_maps(&settings.connectors, &settings.redis_url).await;
    let rate_limiter =
        connectors::init_rate_limiter(&settings.connectors.rate_limit, &settings.redis_url).await;

    let authorization = middleware::authorization::try_new(
        &settings.access_control.model_path,
        &settings.access_control.policy_path,
    )
    .await?;

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let msg: String = match err {
            error::JsonPayloadError::Deserialize(err) => format!(
                "{{\"kind\":\"deserialize\",\"line\":{}, \"column\":{}, \"msg\":\"{}\"}}",
                err.line(),
                err.column(),
                err
            ),
            _ => format!("{{\"kind\":\"other\",\"msg\":\"{}\"}}", err),
        };
        error::InternalError::new(msg, http::StatusCode::BAD_REQUEST).into()
    });

    let settings = web::Data::new(settings);
    let pg_pool = web::Data::new(pg_pool);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(authorization.clone())
            .wrap(middleware::authentication::Manager::new())
            .wrap(actix_web::middleware::Compress::default())
            .wrap(Cors::permissive())
            .app_data(oauth_http_client.clone())
            .app_data(oauth_cache.clone())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/forms")
                            .service(routes::form::list_handler)
                            .service(routes::form::available_handler)
                            .service(routes::form::access_handler)
                            .service(routes::form::validate_handler)
                            .service(routes::form::item_handler),
                    )
                    .service(
                        web::scope("/bundles")
                            .service(routes::bundle::list_handler)
                            .service(routes::bundle::item_handler),
                    )
                    .service(
                        web::scope("/documents")
                            .service(routes::document::list_handler)
                            .service(routes::document::add_handler)
                            .service(routes::document::complete_handler)
                            .service(routes::document::render_handler)
                            .service(routes::document::item_handler)
                            .service(routes::document::update_handler)
                            .service(routes::document::delete_handler),
                    )
                    .service(web::scope("/subscription").service(routes::subscription::status_handler))
                    .service(web::scope("/purchases").service(routes::purchase::list_handler))
                    .service(web::scope("/cross_sell").service(routes::cross_sell::list_handler))
                    .service(
                        web::scope("/calculators")
                            .service(routes::calculator::notice_period_handler)
                            .service(routes::calculator::deposit_handler)
                            .service(routes::calculator::rent_increase_handler)
                            .service(routes::calculator::utilities_handler),
                    )
                    .service(
                        web::scope("/validate")
                            .service(routes::validate::iban_handler)
                            .service(routes::validate::plz_handler)
                            .service(routes::validate::password_handler),
                    )
                    .service(
                        web::scope("/maps")
                            .service(routes::maps::autocomplete_handler)
                            .service(routes::maps::place_handler)
                            .service(routes::maps::static_map_handler),
                    ),
            )
            .app_data(json_config.clone())
            .app_data(pg_pool.clone())
            .app_data(entitlement_resolver.clone())
            .app_data(maps_connector.clone())
            .app_data(rate_limiter.clone())
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
