use std::env;

use auth::TokenPolicy;
use auth::TokenPolicyError;
use config::builder::ConfigBuilder;
use config::builder::DefaultState;
use config::Config as RawConfig;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Environment variable that overrides `jwt.secret`.
pub const SECRET_ENV_VAR: &str = "AUTH_SECRET_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_ttl_hours")]
    pub access_token_ttl_hours: i64,
    #[serde(default = "default_refresh_token_ttl_hours")]
    pub refresh_token_ttl_hours: i64,
}

// Keeps the secret out of logs.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl_hours", &self.access_token_ttl_hours)
            .field("refresh_token_ttl_hours", &self.refresh_token_ttl_hours)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collection: "users".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

impl JwtConfig {
    /// Token lifetimes as an issuing policy.
    pub fn token_policy(&self) -> Result<TokenPolicy, TokenPolicyError> {
        TokenPolicy::from_hours(self.access_token_ttl_hours, self.refresh_token_ttl_hours)
    }
}

impl StoreConfig {
    /// Collection names end up in index names, so only `[A-Za-z0-9_]` is allowed.
    fn is_valid_collection(&self) -> bool {
        !self.collection.is_empty()
            && self
                .collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

fn default_access_token_ttl_hours() -> i64 {
    auth::authenticator::ACCESS_TOKEN_TTL_HOURS
}

fn default_refresh_token_ttl_hours() -> i64 {
    auth::authenticator::REFRESH_TOKEN_TTL_HOURS
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. `AUTH_SECRET_KEY` for the signing secret
    /// 2. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, DATABASE__URL, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    ///
    /// A missing or empty signing secret is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = RawConfig::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__").try_parsing(true))
            .set_override_option("jwt.secret", env::var(SECRET_ENV_VAR).ok())?;

        Self::from_builder(builder)
    }

    /// Build, deserialize and validate a layered configuration.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must not be empty".to_string(),
            ));
        }

        self.jwt
            .token_policy()
            .map_err(|e| ConfigError::Message(format!("jwt: {}", e)))?;

        if !self.store.is_valid_collection() {
            return Err(ConfigError::Message(format!(
                "store.collection must be a non-empty name of letters, digits and underscores, got {:?}",
                self.store.collection
            )));
        }

        Ok(())
    }
}
