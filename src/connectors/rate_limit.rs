//! Per-user sliding window limiter for the maps proxy.
//!
//! Each request is recorded as a member of a Redis sorted set scored by its
//! timestamp in milliseconds; entries older than the window are dropped
//! before counting.

use super::config::RateLimitConfig;
use super::errors::ConnectorError;
use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Seconds until the oldest request leaves the window, 0 when allowed.
    pub retry_after_secs: u64,
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record a request for `key` unless the window is full.
    async fn hit(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision, ConnectorError>;
}

pub struct RedisRateLimiter {
    connection: Arc<Mutex<ConnectionManager>>,
    max_requests: u32,
    window_ms: i64,
}

impl RedisRateLimiter {
    pub async fn new(redis_url: &str, config: &RateLimitConfig) -> Result<Self, ConnectorError> {
        let client = redis::Client::open(redis_url).map_err(|err| {
            ConnectorError::Internal(format!("Invalid Redis URL for rate limiter: {}", err))
        })?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            max_requests: config.max_requests,
            window_ms: (config.window_secs as i64) * 1000,
        })
    }

    fn key(key: &str) -> String {
        format!("ratelimit:maps:{}", key)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn hit(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision, ConnectorError> {
        let redis_key = Self::key(key);
        let now_ms = now.timestamp_millis();
        let cutoff = now_ms - self.window_ms;

        let mut conn = self.connection.lock().await;
        let (count, oldest): (u32, Vec<(String, f64)>) = redis::pipe()
            .atomic()
            .zrembyscore(&redis_key, 0, cutoff)
            .ignore()
            .zcard(&redis_key)
            .zrange_withscores(&redis_key, 0, 0)
            .query_async(&mut *conn)
            .await?;

        if count >= self.max_requests {
            let retry_after_ms = oldest
                .first()
                .map(|(_, score)| *score as i64 + self.window_ms - now_ms)
                .unwrap_or(self.window_ms)
                .max(0);
            return Ok(RateDecision {
                allowed: false,
                remaining: 0,
                retry_after_secs: ((retry_after_ms + 999) / 1000) as u64,
            });
        }

        let member = format!("{}:{}", now_ms, Uuid::new_v4());
        let (): () = redis::pipe()
            .atomic()
            .zadd(&redis_key, member, now_ms)
            .ignore()
            .pexpire(&redis_key, self.window_ms)
            .ignore()
            .query_async(&mut *conn)
            .await?;

        Ok(RateDecision {
            allowed: true,
            remaining: self.max_requests - count - 1,
            retry_after_secs: 0,
        })
    }
}

/// Process-local limiter used when Redis is not reachable.
pub struct MemoryRateLimiter {
    entries: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
    max_requests: u32,
    window: chrono::Duration,
}

impl MemoryRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_requests: config.max_requests,
            window: chrono::Duration::seconds(config.window_secs as i64),
        }
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn hit(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision, ConnectorError> {
        let cutoff = now - self.window;
        let mut entries = self.entries.lock().await;
        // users whose whole window has passed are forgotten
        entries.retain(|_, window| window.back().map_or(false, |last| *last > cutoff));
        let window = entries.entry(key.to_string()).or_default();

        while window.front().map_or(false, |at| *at <= cutoff) {
            window.pop_front();
        }

        if window.len() as u32 >= self.max_requests {
            let retry_after_ms = window
                .front()
                .map(|oldest| (*oldest + self.window - now).num_milliseconds().max(0))
                .unwrap_or(0);
            if window.is_empty() {
                entries.remove(key);
            }
            return Ok(RateDecision {
                allowed: false,
                remaining: 0,
                retry_after_secs: ((retry_after_ms + 999) / 1000) as u64,
            });
        }

        window.push_back(now);
        Ok(RateDecision {
            allowed: true,
            remaining: self.max_requests - window.len() as u32,
            retry_after_secs: 0,
        })
    }
}

pub async fn init(config: &RateLimitConfig, redis_url: &str) -> web::Data<Arc<dyn RateLimiter>> {
    let limiter: Arc<dyn RateLimiter> = match RedisRateLimiter::new(redis_url, config).await {
        Ok(limiter) => {
            tracing::info!(
                max_requests = config.max_requests,
                window_secs = config.window_secs,
                "Redis rate limiter initialized"
            );
            Arc::new(limiter)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Redis rate limiter unavailable, limiting per process");
            Arc::new(MemoryRateLimiter::new(config))
        }
    };

    web::Data::new(limiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn limiter(max_requests: u32) -> MemoryRateLimiter {
        MemoryRateLimiter::new(&RateLimitConfig {
            max_requests,
            window_secs: 3600,
        })
    }

    #[tokio::test]
    async fn hundred_requests_per_hour() {
        let limiter = limiter(100);
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

        for i in 0..100 {
            let decision = limiter.hit("user-1", start + Duration::seconds(i)).await.unwrap();
            assert!(decision.allowed, "request {} should pass", i);
        }

        let denied = limiter.hit("user-1", start + Duration::minutes(10)).await.unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after_secs, 3000);

        let other_user = limiter.hit("user-2", start + Duration::minutes(10)).await.unwrap();
        assert!(other_user.allowed);
    }

    #[tokio::test]
    async fn window_slides() {
        let limiter = limiter(2);
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

        assert!(limiter.hit("u", start).await.unwrap().allowed);
        assert!(limiter.hit("u", start + Duration::minutes(30)).await.unwrap().allowed);
        assert!(!limiter.hit("u", start + Duration::minutes(59)).await.unwrap().allowed);

        let after_first_expired = limiter.hit("u", start + Duration::minutes(60)).await.unwrap();
        assert!(after_first_expired.allowed);
        assert_eq!(after_first_expired.remaining, 0);
    }

    #[tokio::test]
    async fn retry_after_rounds_up_to_whole_seconds() {
        let limiter = limiter(1);
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

        assert!(limiter.hit("u", start).await.unwrap().allowed);
        let denied = limiter
            .hit("u", start + Duration::milliseconds(1500))
            .await
            .unwrap();
        assert!(!denied.allowed);
        // 3598.5 s left in the window
        assert_eq!(denied.retry_after_secs, 3599);
    }

    #[tokio::test]
    async fn idle_users_are_forgotten() {
        let limiter = limiter(5);
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

        for user in ["a", "b", "c"] {
            limiter.hit(user, start).await.unwrap();
        }
        assert_eq!(limiter.entries.lock().await.len(), 3);

        limiter.hit("d", start + Duration::hours(2)).await.unwrap();
        let entries = limiter.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("d"));
    }
}
