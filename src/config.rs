//! Application configuration module
//!
//! Provides centralized, environment-aware configuration. The pipeline
//! reads only the environment: database URL, log settings, and LLM
//! endpoint credentials.

use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Complete application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub llm: LlmSettings,
    pub entity_cache: EntityCacheSettings,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database: DatabaseSettings::from_env()?,
            llm: LlmSettings::from_env()?,
            entity_cache: EntityCacheSettings::from_env(),
        })
    }
}

/// Database settings
#[derive(Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingRequired("DATABASE_URL".to_string()))?;

        Ok(Self {
            url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(20),
            acquire_timeout: Duration::from_secs(
                std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}

/// LLM endpoint settings shared by the classifiers and the entity
/// normalizer.
#[derive(Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub classification_model: String,
    pub normalization_model: String,
}

impl LlmSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ConfigError::MissingRequired("ANTHROPIC_API_KEY".to_string()))?;

        if api_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "ANTHROPIC_API_KEY".to_string(),
                message: "API key cannot be empty".to_string(),
            });
        }

        Ok(Self {
            api_key,
            base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1".to_string()),
            classification_model: std::env::var("CLASSIFICATION_MODEL")
                .unwrap_or_else(|_| "claude-3-5-haiku-latest".to_string()),
            normalization_model: std::env::var("NORMALIZATION_MODEL")
                .unwrap_or_else(|_| "claude-3-5-haiku-latest".to_string()),
        })
    }
}

/// Entity cache sizing. Read once at process startup when the singleton
/// cache is first constructed.
#[derive(Clone, Copy)]
pub struct EntityCacheSettings {
    pub max_size: usize,
    pub ttl: Duration,
}

impl EntityCacheSettings {
    /// Default TTL of 14 days.
    pub const DEFAULT_TTL_SECS: u64 = 14 * 24 * 60 * 60;
    /// Default capacity of 100k entries.
    pub const DEFAULT_MAX_SIZE: usize = 100_000;

    pub fn from_env() -> Self {
        Self {
            max_size: std::env::var("ENTITY_CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_MAX_SIZE),
            ttl: Duration::from_secs(
                std::env::var("ENTITY_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(Self::DEFAULT_TTL_SECS),
            ),
        }
    }
}

impl Default for EntityCacheSettings {
    fn default() -> Self {
        Self {
            max_size: Self::DEFAULT_MAX_SIZE,
            ttl: Duration::from_secs(Self::DEFAULT_TTL_SECS),
        }
    }
}

/// Initialize tracing from the environment. `LOG_JSON=1` switches to
/// JSON-formatted output for log aggregation.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_cache_defaults() {
        let settings = EntityCacheSettings::default();
        assert_eq!(settings.max_size, 100_000);
        assert_eq!(settings.ttl.as_secs(), 14 * 24 * 60 * 60);
    }
}
