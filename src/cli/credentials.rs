use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::error::CliError;

/// Directory holding the client's local state: `$XDG_CONFIG_HOME/mietrecht`,
/// `~/.config/mietrecht` when unset.
pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("mietrecht")
}

/// Write a file readable by the owner only.
pub(crate) fn write_private(path: &Path, content: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StoredCredentials - what we persist to disk
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Session of the signed-in user, stored at `<config_dir>/credentials.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub email: Option<String>,
    pub auth_url: Option<String>,
}

impl StoredCredentials {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn expires_within(&self, margin: Duration) -> bool {
        Utc::now() + margin >= self.expires_at
    }
}

/// Raw JSON returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

/// Longest session lifetime accepted from the auth server (one year).
const MAX_EXPIRES_IN_SECS: u64 = 365 * 24 * 3600;

impl From<TokenResponse> for StoredCredentials {
    fn from(resp: TokenResponse) -> Self {
        let expires_in = resp.expires_in.unwrap_or(3600).min(MAX_EXPIRES_IN_SECS);
        Self {
            access_token: resp.access_token,
            token_type: resp.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at: Utc::now() + Duration::seconds(expires_in as i64),
            email: None,
            auth_url: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CredentialStore - storage back-ends
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub trait CredentialStore: Send + Sync {
    fn save(&self, creds: &StoredCredentials) -> Result<(), CliError>;
    fn load(&self) -> Result<Option<StoredCredentials>, CliError>;
    fn delete(&self) -> Result<(), CliError>;
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn default_path() -> PathBuf {
        config_dir().join("credentials.json")
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_default_path() -> Self {
        Self::new(Self::default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, creds: &StoredCredentials) -> Result<(), CliError> {
        let json = serde_json::to_string_pretty(creds)
            .map_err(|e| CliError::Storage(format!("Failed to serialize credentials: {e}")))?;
        write_private(&self.path, &json)
    }

    fn load(&self) -> Result<Option<StoredCredentials>, CliError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let creds: StoredCredentials = serde_json::from_str(&content)
            .map_err(|e| CliError::Storage(format!("Corrupt credentials file: {e}")))?;

        Ok(Some(creds))
    }

    fn delete(&self) -> Result<(), CliError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CredentialsManager - high-level operations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct CredentialsManager<S: CredentialStore> {
    store: S,
}

impl<S: CredentialStore> CredentialsManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save(&self, creds: &StoredCredentials) -> Result<(), CliError> {
        self.store.save(creds)
    }

    pub fn load(&self) -> Result<Option<StoredCredentials>, CliError> {
        self.store.load()
    }

    pub fn logout(&self) -> Result<(), CliError> {
        self.store.delete()
    }

    /// Token of a live session, `None` when signed out or expired.
    pub fn session_token(&self) -> Result<Option<String>, CliError> {
        Ok(self
            .store
            .load()?
            .filter(|creds| !creds.is_expired())
            .map(|creds| creds.access_token))
    }

    /// Present and not expired, `LoginRequired` / `TokenExpired` otherwise.
    pub fn require_valid_token(&self, feature: &str) -> Result<StoredCredentials, CliError> {
        let creds = self.store.load()?.ok_or_else(|| CliError::LoginRequired {
            feature: feature.to_string(),
        })?;

        if creds.is_expired() {
            return Err(CliError::TokenExpired);
        }

        Ok(creds)
    }
}

impl CredentialsManager<FileCredentialStore> {
    pub fn with_default_store() -> Self {
        Self::new(FileCredentialStore::with_default_path())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Login
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const DEFAULT_AUTH_URL: &str = "http://127.0.0.1:4000";

const TOKEN_ENDPOINT: &str = "/auth/login";

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub auth_url: String,
}

#[async_trait]
pub trait OAuthClient: Send + Sync {
    async fn request_token(
        &self,
        auth_url: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, CliError>;
}

pub struct HttpOAuthClient {
    http: reqwest::Client,
}

impl HttpOAuthClient {
    pub fn new() -> Result<Self, CliError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CliError::AuthFailed(format!("HTTP client error: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl OAuthClient for HttpOAuthClient {
    async fn request_token(
        &self,
        auth_url: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, CliError> {
        let url = format!("{}{}", auth_url.trim_end_matches('/'), TOKEN_ENDPOINT);
        let resp = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "password"),
                ("username", email),
                ("password", password),
            ])
            .send()
            .await
            .map_err(|e| CliError::AuthFailed(format!("Network error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body: String = resp.text().await.unwrap_or_default().chars().take(240).collect();
            return Err(CliError::AuthFailed(format!("HTTP {status}: {body}")));
        }

        resp.json()
            .await
            .map_err(|e| CliError::AuthFailed(format!("Invalid token response: {e}")))
    }
}

/// Obtain a token and persist it.
pub async fn login<S: CredentialStore, O: OAuthClient>(
    store: &CredentialsManager<S>,
    oauth: &O,
    request: &LoginRequest,
) -> Result<StoredCredentials, CliError> {
    let token = oauth
        .request_token(&request.auth_url, &request.email, &request.password)
        .await?;
    let mut creds = StoredCredentials::from(token);
    creds.email = Some(request.email.clone());
    creds.auth_url = Some(request.auth_url.clone());

    store.save(&creds)?;
    Ok(creds)
}

impl fmt::Display for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let email = self.email.as_deref().unwrap_or("<unknown>");
        let expired = if self.is_expired() { " (expired)" } else { "" };
        write!(f, "Logged in as {email}{expired}")
    }
}
