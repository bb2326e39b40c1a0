use async_trait::async_trait;

use crate::cli::api_client::ApiClient;
use crate::models::SubscriptionStatusView;
use crate::services::SubscriptionSource;

/// Feeds the subscription poller from `GET /api/subscription`.
pub struct HttpSubscriptionSource {
    client: ApiClient,
}

impl HttpSubscriptionSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubscriptionSource for HttpSubscriptionSource {
    async fn fetch_status(&self) -> Result<SubscriptionStatusView, String> {
        self.client
            .subscription_status()
            .await
            .map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_status_with_the_session_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/subscription"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_status": "OK",
                "msg": "OK",
                "item": {
                    "active": true,
                    "plan_code": "mietrecht-monthly",
                    "current_period_end": null,
                    "owned_apps": ["mietrecht"]
                }
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Some("abc".to_string())).unwrap();
        let status = HttpSubscriptionSource::new(client).fetch_status().await.unwrap();
        assert!(status.active);
        assert_eq!(status.owned_apps, vec!["mietrecht".to_string()]);
    }

    #[tokio::test]
    async fn failures_become_messages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/subscription"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"msg": "boom"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Some("abc".to_string())).unwrap();
        let err = HttpSubscriptionSource::new(client).fetch_status().await.unwrap_err();
        assert!(err.contains("boom"));
    }
}
