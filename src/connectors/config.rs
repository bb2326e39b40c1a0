use serde::{Deserialize, Serialize};

/// Configuration for external service connectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub maps_service: Option<MapsConnectorConfig>,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            maps_service: Some(MapsConnectorConfig::default()),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Geocoding / static map connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConnectorConfig {
    /// Enable/disable the upstream maps API, the mock answers otherwise
    pub enabled: bool,
    /// Maps API base URL
    pub base_url: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Number of retry attempts for transient failures
    pub retry_attempts: usize,
    /// Result language
    #[serde(default = "MapsConnectorConfig::default_language")]
    pub language: String,
    /// ISO country autocomplete results are restricted to
    #[serde(default = "MapsConnectorConfig::default_country")]
    pub country: String,
    /// Optional Redis connection string override, no cache when unset
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "MapsConnectorConfig::default_autocomplete_ttl")]
    pub cache_ttl_autocomplete_secs: u64,
    #[serde(default = "MapsConnectorConfig::default_place_ttl")]
    pub cache_ttl_place_secs: u64,
    #[serde(default = "MapsConnectorConfig::default_static_ttl")]
    pub cache_ttl_static_secs: u64,
    /// API key (falls back to MAPS_API_KEY env)
    #[serde(default)]
    pub api_key: Option<String>,
}

impl MapsConnectorConfig {
    fn default_language() -> String {
        "de".to_string()
    }

    fn default_country() -> String {
        "de".to_string()
    }

    const fn default_autocomplete_ttl() -> u64 {
        3_600
    }

    const fn default_place_ttl() -> u64 {
        86_400
    }

    const fn default_static_ttl() -> u64 {
        604_800
    }
}

impl Default for MapsConnectorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://maps.googleapis.com".to_string(),
            timeout_secs: 10,
            retry_attempts: 2,
            language: Self::default_language(),
            country: Self::default_country(),
            redis_url: None,
            cache_ttl_autocomplete_secs: Self::default_autocomplete_ttl(),
            cache_ttl_place_secs: Self::default_place_ttl(),
            cache_ttl_static_secs: Self::default_static_ttl(),
            api_key: None,
        }
    }
}

/// Sliding window limit for the maps proxy, per user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "RateLimitConfig::default_max_requests")]
    pub max_requests: u32,
    #[serde(default = "RateLimitConfig::default_window_secs")]
    pub window_secs: u64,
}

impl RateLimitConfig {
    const fn default_max_requests() -> u32 {
        100
    }

    const fn default_window_secs() -> u64 {
        3_600
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: Self::default_max_requests(),
            window_secs: Self::default_window_secs(),
        }
    }
}
