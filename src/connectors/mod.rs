//! External service connectors
//!
//! Every upstream API is reached through a trait so routes can be tested
//! against a mock:
//!
//! 1. trait + HTTP client in `{service}.rs`
//! 2. configuration in `config.rs`, enabled per environment
//! 3. `init()` builds the client or falls back to the mock and hands out
//!    `web::Data<Arc<dyn Trait>>`

pub mod config;
pub mod errors;
pub mod maps_service;
pub mod rate_limit;

pub use config::{ConnectorConfig, MapsConnectorConfig, RateLimitConfig};
pub use errors::ConnectorError;
pub use maps_service::{
    MapsClient, MapsConnector, PlaceDetails, Prediction, StaticMap, StaticMapRequest,
};
pub use rate_limit::{MemoryRateLimiter, RateDecision, RateLimiter, RedisRateLimiter};

pub use maps_service::init as init_maps;
pub use rate_limit::init as init_rate_limiter;
