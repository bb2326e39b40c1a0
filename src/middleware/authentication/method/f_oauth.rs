use crate::configuration::Settings;
use crate::forms;
use crate::middleware::authentication::get_header;
use crate::models;
use actix_web::{dev::ServiceRequest, web, HttpMessage};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Users resolved from bearer tokens, kept for a short TTL so every request
/// does not hit the auth server.
pub struct OAuthCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedUser>>,
}

struct CachedUser {
    user: models::User,
    expires_at: Instant,
}

impl OAuthCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, token: &str) -> Option<models::User> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(token) {
                Some(entry) if entry.expires_at > now => return Some(entry.user.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // expired, drop it
        let mut entries = self.entries.write().await;
        if entries.get(token).map_or(false, |entry| entry.expires_at <= now) {
            entries.remove(token);
        }

        None
    }

    /// Stores the user and drops every entry that has already expired.
    pub async fn insert(&self, token: String, user: models::User) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            token,
            CachedUser {
                user,
                expires_at: now + self.ttl,
            },
        );
    }
}

fn try_extract_token(authentication: String) -> Result<String, String> {
    let mut authentication_parts = authentication.splitn(2, ' ');
    match authentication_parts.next() {
        Some("Bearer") => {}
        _ => return Err("Bearer missing scheme".to_string()),
    }

    match authentication_parts.next().map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => {
            tracing::error!("Bearer token is missing");
            Err("Authentication required".to_string())
        }
    }
}

/// Resolve the bearer token into a user. `Ok(false)` when no
/// authorization header was sent.
#[tracing::instrument(name = "Authenticate with bearer token", skip(req))]
pub async fn try_oauth(req: &mut ServiceRequest) -> Result<bool, String> {
    let Some(authentication) = get_header::<String>(req, "authorization")? else {
        return Ok(false);
    };

    let token = try_extract_token(authentication)?;
    let (Some(settings), Some(http_client), Some(cache)) = (
        req.app_data::<web::Data<Settings>>(),
        req.app_data::<web::Data<reqwest::Client>>(),
        req.app_data::<web::Data<OAuthCache>>(),
    ) else {
        tracing::error!("authentication is not configured");
        return Err("Authentication is not available".to_string());
    };

    let mut user = match cache.get(&token).await {
        Some(user) => user,
        None => {
            let user = fetch_user(http_client.get_ref(), settings.auth_url.as_str(), &token).await?;
            cache.insert(token.clone(), user.clone()).await;
            user
        }
    };
    user.access_token = Some(token);

    tracing::debug!("ACL check for role: {}", user.role);
    let acl_vals = actix_casbin_auth::CasbinVals {
        subject: user.role.clone(),
        domain: None,
    };

    if req.extensions_mut().insert(Arc::new(user)).is_some() {
        return Err("user already logged".to_string());
    }

    if req.extensions_mut().insert(acl_vals).is_some() {
        return Err("Something wrong with access control".to_string());
    }

    Ok(true)
}

pub async fn fetch_user(
    client: &reqwest::Client,
    auth_url: &str,
    token: &str,
) -> Result<models::User, String> {
    let resp = client
        .get(auth_url)
        .bearer_auth(token)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|err| {
            tracing::error!(target: "auth", error = %err, "OAuth request failed");
            "No response from OAuth server".to_string()
        })?;

    if !resp.status().is_success() {
        return Err("401 Unauthorized".to_string());
    }

    resp.json::<forms::UserForm>()
        .await
        .map_err(|_err| "can't parse the response body".to_string())?
        .try_into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_scheme_is_required() {
        assert_eq!(try_extract_token("Bearer abc".to_string()).unwrap(), "abc");
        assert!(try_extract_token("Basic abc".to_string()).is_err());
        assert!(try_extract_token("Bearer ".to_string()).is_err());
    }

    fn user() -> models::User {
        models::User {
            id: "u1".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn cache_returns_live_entries() {
        let cache = OAuthCache::new(Duration::from_secs(60));
        cache.insert("token".to_string(), user()).await;
        assert_eq!(cache.get("token").await.map(|user| user.id), Some("u1".to_string()));
        assert!(cache.get("other").await.is_none());
    }

    #[tokio::test]
    async fn cache_drops_expired_entries() {
        let cache = OAuthCache::new(Duration::ZERO);
        cache.insert("token".to_string(), user()).await;
        assert!(cache.get("token").await.is_none());
        assert!(cache.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn insert_sweeps_tokens_nobody_asks_for_again() {
        let cache = OAuthCache::new(Duration::ZERO);
        for token in ["a", "b", "c"] {
            cache.insert(token.to_string(), user()).await;
        }
        let entries = cache.entries.read().await;
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("c"));
    }
}
