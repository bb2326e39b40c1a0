//! Commands of the `mietrecht-cli` binary.

pub mod account;
pub mod calc;
pub mod documents;
pub mod fill;
pub mod forms;

use async_trait::async_trait;
use serde::Serialize;

use crate::cli::api_client::ApiClient;
use crate::cli::credentials::{CredentialsManager, FileCredentialStore};
use crate::cli::error::CliError;

#[async_trait]
pub trait CallableTrait: Send + Sync {
    async fn call(&self, ctx: &Context) -> Result<(), CliError>;
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub api_url: String,
    pub auth_url: String,
    /// Print raw JSON instead of text
    pub json: bool,
}

impl Context {
    pub fn credentials(&self) -> CredentialsManager<FileCredentialStore> {
        CredentialsManager::with_default_store()
    }

    pub fn session_token(&self) -> Result<Option<String>, CliError> {
        self.credentials().session_token()
    }

    /// Client carrying the session token when there is one.
    pub fn client(&self) -> Result<ApiClient, CliError> {
        ApiClient::new(&self.api_url, self.session_token()?)
    }

    /// Client for commands that only make sense when signed in.
    pub fn signed_in_client(&self, feature: &str) -> Result<ApiClient, CliError> {
        let creds = self.credentials().require_valid_token(feature)?;
        ApiClient::new(&self.api_url, Some(creds.access_token))
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<(), CliError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| CliError::InvalidResponse(e.to_string()))?;
        println!("{json}");
        Ok(())
    }
}
