use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;

/// Errors raised while talking to upstream APIs
#[derive(Debug)]
pub enum ConnectorError {
    /// HTTP request/response error
    HttpError(String),
    /// Upstream unreachable or timed out
    ServiceUnavailable(String),
    /// Upstream answered with something we could not parse
    InvalidResponse(String),
    /// Rejected credentials or API key
    Unauthorized(String),
    NotFound(String),
    /// Upstream quota or local sliding window exceeded
    RateLimited(String),
    Internal(String),
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            Self::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ConnectorError {}

impl ConnectorError {
    /// Message safe to show to API callers. Details stay in the logs.
    fn public_message(&self) -> &'static str {
        match self {
            Self::HttpError(_) | Self::InvalidResponse(_) => "Kartendienst nicht erreichbar",
            Self::ServiceUnavailable(_) => "Kartendienst vorübergehend nicht verfügbar",
            Self::Unauthorized(_) => "Kartendienst nicht autorisiert",
            Self::NotFound(_) => "Ort nicht gefunden",
            Self::RateLimited(_) => "Zu viele Anfragen, bitte später erneut versuchen",
            Self::Internal(_) => "Interner Fehler",
        }
    }
}

impl ResponseError for ConnectorError {
    fn error_response(&self) -> HttpResponse {
        tracing::error!(error = %self, "connector error");
        HttpResponse::build(self.status_code()).json(json!({
            "_status": "error",
            "msg": self.public_message(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::HttpError(_) | Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            // rejected upstream API key
            Self::Unauthorized(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            Self::ServiceUnavailable(format!("Connection failed: {}", err))
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<redis::RedisError> for ConnectorError {
    fn from(err: redis::RedisError) -> Self {
        Self::ServiceUnavailable(format!("Redis: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_maps_to_429() {
        let err = ConnectorError::RateLimited("100/h".to_string());
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn upstream_key_problems_are_gateway_errors() {
        let err = ConnectorError::Unauthorized("REQUEST_DENIED".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_response().status(), StatusCode::BAD_GATEWAY);
    }
}
