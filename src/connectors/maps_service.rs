use super::config::{ConnectorConfig, MapsConnectorConfig};
use super::errors::ConnectorError;
use actix_web::web;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::Instrument;

/// Address suggestion for a partial input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Prediction {
    pub place_id: String,
    pub description: String,
    #[serde(default)]
    pub main_text: Option<String>,
    #[serde(default)]
    pub secondary_text: Option<String>,
}

/// Postal address resolved from a place id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaceDetails {
    pub place_id: String,
    pub formatted_address: String,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StaticMapRequest {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "StaticMapRequest::default_zoom")]
    pub zoom: u8,
    #[serde(default = "StaticMapRequest::default_size")]
    pub width: u32,
    #[serde(default = "StaticMapRequest::default_size")]
    pub height: u32,
}

impl StaticMapRequest {
    const fn default_zoom() -> u8 {
        15
    }

    const fn default_size() -> u32 {
        400
    }

    /// Clamp to what the upstream accepts.
    pub fn normalized(self) -> Self {
        Self {
            lat: self.lat.clamp(-90.0, 90.0),
            lng: self.lng.clamp(-180.0, 180.0),
            zoom: self.zoom.clamp(1, 20),
            width: self.width.clamp(1, 640),
            height: self.height.clamp(1, 640),
        }
    }

    fn cache_key(&self) -> String {
        format!(
            "maps:static:{:.5}:{:.5}:{}:{}x{}",
            self.lat, self.lng, self.zoom, self.width, self.height
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticMap {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Redis representation of a [`StaticMap`].
#[derive(Serialize, Deserialize)]
struct CachedImage {
    content_type: String,
    data: String,
}

impl From<&StaticMap> for CachedImage {
    fn from(image: &StaticMap) -> Self {
        Self {
            content_type: image.content_type.clone(),
            data: general_purpose::STANDARD.encode(&image.bytes),
        }
    }
}

impl CachedImage {
    fn into_image(self) -> Option<StaticMap> {
        general_purpose::STANDARD
            .decode(self.data)
            .ok()
            .map(|bytes| StaticMap {
                content_type: self.content_type,
                bytes,
            })
    }
}

#[async_trait]
pub trait MapsConnector: Send + Sync {
    async fn autocomplete(
        &self,
        input: &str,
        session: Option<&str>,
    ) -> Result<Vec<Prediction>, ConnectorError>;
    async fn place_details(
        &self,
        place_id: &str,
        session: Option<&str>,
    ) -> Result<PlaceDetails, ConnectorError>;
    async fn static_map(&self, request: StaticMapRequest) -> Result<StaticMap, ConnectorError>;
}

#[derive(Clone)]
struct RedisCache {
    connection: Arc<Mutex<ConnectionManager>>,
}

impl RedisCache {
    async fn new(redis_url: &str) -> Result<Self, ConnectorError> {
        let client = redis::Client::open(redis_url).map_err(|err| {
            ConnectorError::Internal(format!("Invalid Redis URL for maps cache: {}", err))
        })?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|err| ConnectorError::ServiceUnavailable(format!("Redis unavailable: {}", err)))?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    async fn get<T>(&self, key: &str) -> Result<Option<T>, ConnectorError>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.connection.lock().await;
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(payload) if !payload.is_empty() => serde_json::from_str::<T>(&payload)
                .map(Some)
                .map_err(|err| ConnectorError::Internal(format!("Cache decode failed: {}", err))),
            _ => Ok(None),
        }
    }

    async fn set<T>(&self, key: &str, value: &T, ttl_secs: u64) -> Result<(), ConnectorError>
    where
        T: Serialize,
    {
        if ttl_secs == 0 {
            return Ok(());
        }

        let payload = serde_json::to_string(value)
            .map_err(|err| ConnectorError::Internal(format!("Cache encode failed: {}", err)))?;

        let mut conn = self.connection.lock().await;
        let (): () = conn.set_ex(key, payload, ttl_secs).await?;
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct CacheDurations {
    autocomplete: u64,
    place: u64,
    static_map: u64,
}

/// Client for a Google Places / Static Maps compatible API.
pub struct MapsClient {
    base_url: String,
    http_client: reqwest::Client,
    api_key: String,
    language: String,
    country: String,
    retry_attempts: usize,
    cache: Option<RedisCache>,
    cache_ttls: CacheDurations,
}

impl MapsClient {
    pub async fn new(config: MapsConnectorConfig) -> Result<Self, ConnectorError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConnectorError::Internal("Maps API key missing".to_string()))?;

        let cache = match config.redis_url.as_deref() {
            Some(url) => match RedisCache::new(url).await {
                Ok(cache) => Some(cache),
                Err(err) => {
                    tracing::warn!(error = %err, "maps cache unavailable, continuing without it");
                    None
                }
            },
            None => None,
        };

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(format!("mietrecht-maps-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ConnectorError::Internal(format!("HTTP client error: {}", err)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            api_key,
            language: config.language,
            country: config.country,
            retry_attempts: config.retry_attempts.max(1),
            cache,
            cache_ttls: CacheDurations {
                autocomplete: config.cache_ttl_autocomplete_secs,
                place: config.cache_ttl_place_secs,
                static_map: config.cache_ttl_static_secs,
            },
        })
    }

    fn cache_suffix(input: &str) -> String {
        urlencoding::encode(&input.trim().to_lowercase()).into_owned()
    }

    async fn read_cache<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, cache_key = key, "maps cache read failed");
                None
            }
        }
    }

    async fn write_cache<T>(&self, key: &str, value: &T, ttl: u64)
    where
        T: Serialize,
    {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        if let Err(err) = cache.set(key, value, ttl).await {
            tracing::debug!(error = %err, cache_key = key, "maps cache write failed");
        }
    }

    /// GET with retries on transport errors and 5xx answers.
    async fn send_request(
        &self,
        path: &str,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<reqwest::Response, ConnectorError> {
        query.push(("key", self.api_key.clone()));

        let mut attempt = 0usize;
        let mut last_error: Option<ConnectorError> = None;

        while attempt < self.retry_attempts {
            attempt += 1;
            let span = tracing::info_span!("maps_http_request", path, attempt);

            let request = self
                .http_client
                .get(format!("{}{}", self.base_url, path))
                .query(&query);

            match request.send().instrument(span).await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp.text().await.unwrap_or_default();
                    let error = match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            ConnectorError::Unauthorized(text)
                        }
                        StatusCode::NOT_FOUND => ConnectorError::NotFound(text),
                        StatusCode::TOO_MANY_REQUESTS => ConnectorError::RateLimited(text),
                        status if status.is_server_error() => ConnectorError::ServiceUnavailable(
                            format!("Maps API error {}: {}", status, text),
                        ),
                        status => {
                            ConnectorError::HttpError(format!("Maps API error {}: {}", status, text))
                        }
                    };

                    if !status.is_server_error() {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(err) => {
                    last_error = Some(ConnectorError::from(err));
                }
            }

            if attempt < self.retry_attempts {
                let backoff = Duration::from_millis(100 * (1_u64 << (attempt - 1)));
                tokio::time::sleep(backoff).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ConnectorError::ServiceUnavailable("Maps API request failed".to_string())
        }))
    }

    async fn get_json(
        &self,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<Value, ConnectorError> {
        let text = self
            .send_request(path, query)
            .await?
            .text()
            .await
            .map_err(|err| ConnectorError::HttpError(err.to_string()))?;
        let payload: Value =
            serde_json::from_str(&text).map_err(|_| ConnectorError::InvalidResponse(text))?;
        Self::check_api_status(&payload)?;
        Ok(payload)
    }

    /// Places API reports failures in the body with HTTP 200.
    fn check_api_status(payload: &Value) -> Result<(), ConnectorError> {
        let status = payload
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("OK");
        let detail = payload
            .get("error_message")
            .and_then(|v| v.as_str())
            .unwrap_or(status)
            .to_string();

        match status {
            "OK" | "ZERO_RESULTS" => Ok(()),
            "NOT_FOUND" => Err(ConnectorError::NotFound(detail)),
            "REQUEST_DENIED" => Err(ConnectorError::Unauthorized(detail)),
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(ConnectorError::RateLimited(detail)),
            "INVALID_REQUEST" => Err(ConnectorError::HttpError(detail)),
            _ => Err(ConnectorError::ServiceUnavailable(detail)),
        }
    }

    pub fn parse_predictions(payload: &Value) -> Vec<Prediction> {
        payload
            .get("predictions")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let structured = item.get("structured_formatting");
                        Some(Prediction {
                            place_id: item.get("place_id")?.as_str()?.to_string(),
                            description: item.get("description")?.as_str()?.to_string(),
                            main_text: structured
                                .and_then(|s| s.get("main_text"))
                                .and_then(|v| v.as_str())
                                .map(|s| s.to_string()),
                            secondary_text: structured
                                .and_then(|s| s.get("secondary_text"))
                                .and_then(|v| v.as_str())
                                .map(|s| s.to_string()),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parse_place(place_id: &str, payload: &Value) -> Result<PlaceDetails, ConnectorError> {
        let result = payload
            .get("result")
            .ok_or_else(|| ConnectorError::NotFound(place_id.to_string()))?;

        let components = result
            .get("address_components")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let component = |kind: &str| {
            components
                .iter()
                .find(|c| {
                    c.get("types")
                        .and_then(|t| t.as_array())
                        .map_or(false, |types| types.iter().any(|t| t.as_str() == Some(kind)))
                })
                .and_then(|c| c.get("long_name"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };
        let location = result.get("geometry").and_then(|g| g.get("location"));

        Ok(PlaceDetails {
            place_id: place_id.to_string(),
            formatted_address: result
                .get("formatted_address")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            street: component("route"),
            house_number: component("street_number"),
            postal_code: component("postal_code"),
            city: component("locality").or_else(|| component("postal_town")),
            country: component("country"),
            lat: location.and_then(|l| l.get("lat")).and_then(|v| v.as_f64()),
            lng: location.and_then(|l| l.get("lng")).and_then(|v| v.as_f64()),
        })
    }
}

#[async_trait]
impl MapsConnector for MapsClient {
    async fn autocomplete(
        &self,
        input: &str,
        session: Option<&str>,
    ) -> Result<Vec<Prediction>, ConnectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(vec![]);
        }

        let cache_key = format!("maps:autocomplete:{}", Self::cache_suffix(trimmed));
        if let Some(cached) = self.read_cache::<Vec<Prediction>>(&cache_key).await {
            return Ok(cached);
        }

        let mut query = vec![
            ("input", trimmed.to_string()),
            ("language", self.language.clone()),
            ("components", format!("country:{}", self.country)),
            ("types", "address".to_string()),
        ];
        if let Some(token) = session {
            query.push(("sessiontoken", token.to_string()));
        }

        let payload = self
            .get_json("/maps/api/place/autocomplete/json", query)
            .await?;
        let predictions = Self::parse_predictions(&payload);
        self.write_cache(&cache_key, &predictions, self.cache_ttls.autocomplete)
            .await;
        Ok(predictions)
    }

    async fn place_details(
        &self,
        place_id: &str,
        session: Option<&str>,
    ) -> Result<PlaceDetails, ConnectorError> {
        let cache_key = format!("maps:place:{}", Self::cache_suffix(place_id));
        if let Some(cached) = self.read_cache::<PlaceDetails>(&cache_key).await {
            return Ok(cached);
        }

        let mut query = vec![
            ("place_id", place_id.to_string()),
            ("language", self.language.clone()),
            (
                "fields",
                "address_component,formatted_address,geometry".to_string(),
            ),
        ];
        if let Some(token) = session {
            query.push(("sessiontoken", token.to_string()));
        }

        let payload = self.get_json("/maps/api/place/details/json", query).await?;
        let details = Self::parse_place(place_id, &payload)?;
        self.write_cache(&cache_key, &details, self.cache_ttls.place)
            .await;
        Ok(details)
    }

    async fn static_map(&self, request: StaticMapRequest) -> Result<StaticMap, ConnectorError> {
        let request = request.normalized();
        let cache_key = request.cache_key();
        if let Some(cached) = self.read_cache::<CachedImage>(&cache_key).await {
            if let Some(image) = cached.into_image() {
                return Ok(image);
            }
        }

        let center = format!("{},{}", request.lat, request.lng);
        let query = vec![
            ("center", center.clone()),
            ("zoom", request.zoom.to_string()),
            ("size", format!("{}x{}", request.width, request.height)),
            ("markers", center),
            ("language", self.language.clone()),
        ];

        let response = self.send_request("/maps/api/staticmap", query).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(ConnectorError::InvalidResponse(format!(
                "unexpected content type {}",
                content_type
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ConnectorError::HttpError(err.to_string()))?
            .to_vec();

        let image = StaticMap {
            content_type,
            bytes,
        };
        self.write_cache(&cache_key, &CachedImage::from(&image), self.cache_ttls.static_map)
            .await;
        Ok(image)
    }
}

/// Initialize the maps connector from app settings
pub async fn init(
    connector_config: &ConnectorConfig,
    redis_url: &str,
) -> web::Data<Arc<dyn MapsConnector>> {
    let connector: Arc<dyn MapsConnector> = if let Some(config) = connector_config
        .maps_service
        .as_ref()
        .filter(|cfg| cfg.enabled)
    {
        let mut cfg = config.clone();

        if cfg.api_key.is_none() {
            cfg.api_key = std::env::var("MAPS_API_KEY").ok();
        }

        if cfg.redis_url.is_none() {
            cfg.redis_url = Some(redis_url.to_string());
        }

        match MapsClient::new(cfg.clone()).await {
            Ok(client) => {
                tracing::info!("Maps connector initialized ({})", cfg.base_url);
                Arc::new(client)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "Failed to initialize maps connector, falling back to mock"
                );
                Arc::new(mock::MockMapsConnector::default())
            }
        }
    } else {
        tracing::warn!("Maps connector disabled - using mock responses");
        Arc::new(mock::MockMapsConnector::default())
    };

    web::Data::new(connector)
}

pub mod mock {
    use super::*;

    /// 1x1 transparent PNG.
    pub const PLACEHOLDER_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[derive(Default)]
    pub struct MockMapsConnector;

    fn places() -> Vec<PlaceDetails> {
        vec![
            PlaceDetails {
                place_id: "mock-berlin-unter-den-linden-1".to_string(),
                formatted_address: "Unter den Linden 1, 10117 Berlin, Deutschland".to_string(),
                street: Some("Unter den Linden".to_string()),
                house_number: Some("1".to_string()),
                postal_code: Some("10117".to_string()),
                city: Some("Berlin".to_string()),
                country: Some("Deutschland".to_string()),
                lat: Some(52.5170),
                lng: Some(13.3966),
            },
            PlaceDetails {
                place_id: "mock-hamburg-jungfernstieg-7".to_string(),
                formatted_address: "Jungfernstieg 7, 20354 Hamburg, Deutschland".to_string(),
                street: Some("Jungfernstieg".to_string()),
                house_number: Some("7".to_string()),
                postal_code: Some("20354".to_string()),
                city: Some("Hamburg".to_string()),
                country: Some("Deutschland".to_string()),
                lat: Some(53.5531),
                lng: Some(9.9925),
            },
            PlaceDetails {
                place_id: "mock-muenchen-marienplatz-8".to_string(),
                formatted_address: "Marienplatz 8, 80331 München, Deutschland".to_string(),
                street: Some("Marienplatz".to_string()),
                house_number: Some("8".to_string()),
                postal_code: Some("80331".to_string()),
                city: Some("München".to_string()),
                country: Some("Deutschland".to_string()),
                lat: Some(48.1374),
                lng: Some(11.5755),
            },
        ]
    }

    #[async_trait]
    impl MapsConnector for MockMapsConnector {
        async fn autocomplete(
            &self,
            input: &str,
            _session: Option<&str>,
        ) -> Result<Vec<Prediction>, ConnectorError> {
            let needle = input.trim().to_lowercase();
            if needle.is_empty() {
                return Ok(vec![]);
            }
            Ok(places()
                .into_iter()
                .filter(|place| place.formatted_address.to_lowercase().contains(&needle))
                .map(|place| Prediction {
                    description: place.formatted_address.clone(),
                    main_text: place
                        .street
                        .as_ref()
                        .map(|street| format!("{} {}", street, place.house_number.clone().unwrap_or_default())),
                    secondary_text: place.city.clone(),
                    place_id: place.place_id,
                })
                .collect())
        }

        async fn place_details(
            &self,
            place_id: &str,
            _session: Option<&str>,
        ) -> Result<PlaceDetails, ConnectorError> {
            places()
                .into_iter()
                .find(|place| place.place_id == place_id)
                .ok_or_else(|| ConnectorError::NotFound(place_id.to_string()))
        }

        async fn static_map(&self, _request: StaticMapRequest) -> Result<StaticMap, ConnectorError> {
            Ok(StaticMap {
                content_type: "image/png".to_string(),
                bytes: PLACEHOLDER_PNG.to_vec(),
            })
        }
    }
}
