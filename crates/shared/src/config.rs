//! Application configuration management.

use std::fmt;

use serde::Deserialize;

/// Conventional storage variables that take precedence over `IMGDROP__*` settings.
const AWS_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("storage.region", "AWS_S3_BUCKET_REGION"),
    ("storage.bucket", "AWS_S3_BUCKET_NAME"),
    ("storage.endpoint", "AWS_S3_ENDPOINT"),
    ("storage.access_key_id", "AWS_ACCESS_KEY_ID"),
    ("storage.secret_access_key", "AWS_SECRET_ACCESS_KEY"),
    ("storage.session_token", "AWS_SESSION_TOKEN"),
];

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Object storage settings.
#[derive(Clone, Deserialize)]
pub struct StorageSettings {
    /// Bucket region.
    pub region: String,
    /// Bucket name.
    pub bucket: String,
    /// Custom endpoint for a local storage emulator.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key ID used for signing.
    pub access_key_id: String,
    /// Secret access key used for signing.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    #[serde(default)]
    pub session_token: Option<String>,
}

impl StorageSettings {
    /// Returns the custom endpoint, treating an empty value as unset.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// Returns the session token, treating an empty value as unset.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref().filter(|t| !t.is_empty())
    }
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("IMGDROP").separator("__"));

        for (key, var) in AWS_ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        builder.build()?.try_deserialize()
    }
}
