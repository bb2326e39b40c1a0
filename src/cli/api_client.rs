//! HTTP client for the forms service.
//!
//! Every response comes in the `{ "_status", "msg", "item", "list", "id" }`
//! envelope. A 401, or a 403 on a request sent without a token, surfaces as
//! [`CliError::AuthRequired`] so callers can start the login flow.

use crate::cli::error::CliError;
use crate::models::{self, FormStep, FormTemplate, Persona, Tier};
use crate::services::FormAccess;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    msg: Option<String>,
    item: Option<T>,
    list: Option<Vec<T>>,
    #[serde(default)]
    meta: Option<Value>,
}

/// Triggers of a source app plus how long the server wants dismissals kept.
#[derive(Debug, Clone, Default)]
pub struct CrossSellOffers {
    pub triggers: Vec<models::CrossSellTrigger>,
    pub dismissal_ttl_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

/// Catalog entry, with steps and access when fetched by slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormInfo {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub persona: Persona,
    pub tier: Tier,
    pub price: f64,
    pub step_count: usize,
    pub field_count: usize,
    #[serde(default)]
    pub access: Option<FormAccess>,
    #[serde(default)]
    pub steps: Option<Vec<FormStep>>,
}

impl FormInfo {
    /// Template for local rendering and validation.
    pub fn template(&self) -> FormTemplate {
        FormTemplate {
            id: self.id,
            slug: self.slug.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            persona: self.persona,
            tier: self.tier,
            price: self.price,
            steps: sqlx::types::Json(self.steps.clone().unwrap_or_default()),
            is_active: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: Uuid,
    pub form_template_id: Uuid,
    pub title: String,
    pub data: Value,
    pub status: models::DocumentStatus,
    pub rendered_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedInfo {
    pub id: Uuid,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewDocument<'a> {
    pub form_slug: &'a str,
    pub title: &'a str,
    pub data: &'a Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentChanges<'a> {
    pub title: &'a str,
    pub data: &'a Map<String, Value>,
}

/// `msg` of an error envelope, the raw body otherwise.
fn error_message(body: String) -> String {
    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|envelope| envelope.msg)
        .unwrap_or(body)
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, CliError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    /// Same server, different session.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            token,
            ..self.clone()
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, CliError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, %url, "api request");
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<ApiResponse<T>>()
                .await
                .map_err(|e| CliError::InvalidResponse(e.to_string()));
        }

        let message = error_message(resp.text().await.unwrap_or_default());

        Err(match status {
            StatusCode::UNAUTHORIZED => CliError::AuthRequired,
            StatusCode::FORBIDDEN if !self.has_token() => CliError::AuthRequired,
            StatusCode::NOT_FOUND if message.is_empty() => CliError::NotFound(path.to_string()),
            StatusCode::NOT_FOUND => CliError::NotFound(message),
            _ => CliError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn item<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        self.send::<T, ()>(Method::GET, path, None)
            .await?
            .item
            .ok_or_else(|| CliError::InvalidResponse(format!("GET {path} returned no item")))
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, CliError> {
        Ok(self
            .send::<T, ()>(Method::GET, path, None)
            .await?
            .list
            .unwrap_or_default())
    }

    async fn write<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, CliError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send::<T, B>(method.clone(), path, Some(body)).await?;
        response.item.ok_or_else(|| {
            CliError::InvalidResponse(format!(
                "{method} {path} returned no item: {}",
                response.msg.unwrap_or_default()
            ))
        })
    }

    // ── Catalog ─────────────────────────────────────

    pub async fn list_forms(&self, query: &[(&str, String)]) -> Result<Vec<FormInfo>, CliError> {
        let query: Vec<String> = query
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();
        let path = if query.is_empty() {
            "/api/forms".to_string()
        } else {
            format!("/api/forms?{}", query.join("&"))
        };
        self.list(&path).await
    }

    /// Forms the signed-in user can open right now.
    pub async fn available_forms(&self) -> Result<Vec<FormInfo>, CliError> {
        self.list("/api/forms/available").await
    }

    pub async fn get_form(&self, slug: &str) -> Result<FormInfo, CliError> {
        self.item(&format!("/api/forms/{}", urlencoding::encode(slug))).await
    }

    pub async fn form_access(&self, slug: &str) -> Result<FormAccess, CliError> {
        self.item(&format!("/api/forms/{}/access", urlencoding::encode(slug)))
            .await
    }

    pub async fn list_bundles(&self) -> Result<Vec<models::BundlePricing>, CliError> {
        self.list("/api/bundles").await
    }

    // ── Documents ───────────────────────────────────

    pub async fn list_documents(&self) -> Result<Vec<DocumentInfo>, CliError> {
        self.list("/api/documents").await
    }

    pub async fn get_document(&self, id: Uuid) -> Result<DocumentInfo, CliError> {
        self.item(&format!("/api/documents/{id}")).await
    }

    pub async fn create_document(&self, document: &NewDocument<'_>) -> Result<DocumentInfo, CliError> {
        self.write(Method::POST, "/api/documents", document).await
    }

    pub async fn update_document(
        &self,
        id: Uuid,
        changes: &DocumentChanges<'_>,
    ) -> Result<DocumentInfo, CliError> {
        self.write(Method::PUT, &format!("/api/documents/{id}"), changes)
            .await
    }

    pub async fn complete_document(&self, id: Uuid) -> Result<DocumentInfo, CliError> {
        self.write(Method::POST, &format!("/api/documents/{id}/complete"), &Value::Null)
            .await
    }

    pub async fn render_document(&self, id: Uuid) -> Result<RenderedInfo, CliError> {
        self.item(&format!("/api/documents/{id}/render")).await
    }

    pub async fn delete_document(&self, id: Uuid) -> Result<(), CliError> {
        self.send::<Value, ()>(Method::DELETE, &format!("/api/documents/{id}"), None)
            .await
            .map(|_| ())
    }

    // ── Account ─────────────────────────────────────

    pub async fn subscription_status(&self) -> Result<models::SubscriptionStatusView, CliError> {
        self.item("/api/subscription").await
    }

    pub async fn cross_sell(&self, source_app: &str) -> Result<CrossSellOffers, CliError> {
        let path = format!("/api/cross_sell/{}", urlencoding::encode(source_app));
        let response = self
            .send::<models::CrossSellTrigger, ()>(Method::GET, &path, None)
            .await?;
        Ok(CrossSellOffers {
            triggers: response.list.unwrap_or_default(),
            dismissal_ttl_days: response
                .meta
                .as_ref()
                .and_then(|meta| meta.get("dismissal_ttl_days"))
                .and_then(Value::as_i64),
        })
    }
}
