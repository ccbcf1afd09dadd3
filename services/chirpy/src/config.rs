//! Service configuration, read once at startup

use chrono::Duration;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Runtime settings shared by every handler
///
/// | Env Var                  | Default        |
/// |--------------------------|----------------|
/// | `TOKEN_SECRET`           | required       |
/// | `POLKA_KEY`              | required       |
/// | `PLATFORM`               | `prod`         |
/// | `BIND_ADDR`              | `0.0.0.0:8080` |
/// | `STATIC_DIR`             | `.`            |
/// | `DEFAULT_TOKEN_TTL_SECS` | `3600`         |
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HMAC secret for session tokens
    pub token_secret: String,
    /// Key the payment provider presents on webhooks
    pub polka_key: String,
    /// Deployment platform; only `dev` allows the admin reset
    pub platform: String,
    pub bind_addr: String,
    /// Directory served under `/app`
    pub static_dir: String,
    pub default_token_ttl_secs: i64,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .set_default("platform", "prod")?
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("static_dir", ".")?
            .set_default("default_token_ttl_secs", 3600)?
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token_secret.trim().is_empty() {
            return Err(ConfigError::Message("TOKEN_SECRET must not be empty".to_string()));
        }
        if self.polka_key.trim().is_empty() {
            return Err(ConfigError::Message("POLKA_KEY must not be empty".to_string()));
        }
        if self.default_token_ttl_secs <= 0 {
            return Err(ConfigError::Message(
                "DEFAULT_TOKEN_TTL_SECS must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }

    pub fn default_token_ttl(&self) -> Duration {
        Duration::seconds(self.default_token_ttl_secs)
    }
}
