#![allow(dead_code)]

use mietrecht::configuration::{get_configuration, DatabaseSettings, Settings};
use serde_json::json;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_TOKEN: &str = "user-token";
pub const USER_ID: &str = "test_user_id";

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub auth_server: MockServer,
}

impl TestApp {
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Auth server answering `/me` for [`USER_TOKEN`] and 401 for anything else.
pub async fn mock_auth_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", format!("Bearer {USER_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "_id": USER_ID,
                "email": "test@example.com",
                "role": "group_user",
                "email_confirmed": true
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    server
}

pub async fn spawn_app_with_configuration(
    mut configuration: Settings,
    auth_server: MockServer,
) -> Option<TestApp> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    configuration.auth_url = format!("{}/me", auth_server.uri());
    // no redis in tests, the connectors fall back to in-process state
    configuration.redis_url = "redis://127.0.0.1:1".to_string();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let server = mietrecht::startup::run(listener, connection_pool.clone(), configuration)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    Some(TestApp {
        address,
        db_pool: connection_pool,
        auth_server,
    })
}

pub async fn spawn_app() -> Option<TestApp> {
    let configuration = get_configuration().expect("Failed to get configuration");
    spawn_app_with_configuration(configuration, mock_auth_server().await).await
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    Ok(connection_pool)
}
