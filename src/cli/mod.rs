pub mod api_client;
pub mod commands;
pub mod credentials;
pub mod dismissals;
pub mod drafts;
pub mod error;
pub mod fill;
pub mod progress;
pub mod prompt;
pub mod save_flow;
pub mod subscription_watch;

pub use api_client::ApiClient;
pub use credentials::{CredentialsManager, FileCredentialStore};
pub use error::CliError;
