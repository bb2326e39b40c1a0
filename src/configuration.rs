use crate::connectors::ConnectorConfig;
use crate::services::BundleScope;
use serde;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub app_port: u16,
    pub app_host: String,
    /// Endpoint returning the user of a bearer token
    pub auth_url: String,
    pub redis_url: String,
    #[serde(default)]
    pub access_control: AccessControlSettings,
    #[serde(default)]
    pub connectors: ConnectorConfig,
    #[serde(default)]
    pub entitlements: EntitlementSettings,
    #[serde(default)]
    pub cross_sell: CrossSellSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct AccessControlSettings {
    pub model_path: String,
    pub policy_path: String,
}

impl Default for AccessControlSettings {
    fn default() -> Self {
        Self {
            model_path: "access_control.conf".to_string(),
            policy_path: "access_control.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct EntitlementSettings {
    /// Whether any completed bundle purchase unlocks paid forms or only a
    /// bundle containing the form
    #[serde(default)]
    pub bundle_scope: BundleScope,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CrossSellSettings {
    pub dismissal_ttl_days: i64,
}

impl Default for CrossSellSettings {
    fn default() -> Self {
        Self {
            dismissal_ttl_days: crate::services::cross_sell::DEFAULT_DISMISSAL_TTL_DAYS,
        }
    }
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port,
        )
    }
}

/// `configuration.yaml` overlaid with `APP__`-prefixed environment
/// variables, e.g. `APP__DATABASE__HOST`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    dotenvy::dotenv().ok();

    config::Config::builder()
        .add_source(config::File::with_name("configuration"))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}
