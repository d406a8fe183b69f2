//! Inference configuration.
//!
//! Configuration comes from environment variables. [`InferenceConfig::from_lookup`]
//! takes the variable source as a function so tests never touch process state.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TEKIR_ENV` | `production` (`test` when a Playwright variable is set) |
//! | `OPENROUTER_BASE_URL` | `https://openrouter.ai/api/v1` |
//! | `OPENROUTER_API_KEY` | none, required in production |
//! | `OPENROUTER_HTTP_REFERER` | `https://tekir.co` |
//! | `OPENROUTER_X_TITLE` | `Tekir` |
//! | `OPENROUTER_TIMEOUT` | `300` |
//!
//! # Example
//!
//! ```rust,no_run
//! use tekir_inference::config::InferenceConfig;
//!
//! let config = InferenceConfig::from_env().expect("Failed to load config");
//! config.validate().expect("Invalid config");
//! ```

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use tekir_core::defaults::REQUEST_TIMEOUT_SECS;

use crate::openai::OpenAICompatibleConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for tekir_core::Error {
    fn from(e: ConfigError) -> Self {
        tekir_core::Error::Config(e.to_string())
    }
}

pub const TEKIR_ENV: &str = "TEKIR_ENV";
pub const OPENROUTER_BASE_URL: &str = "OPENROUTER_BASE_URL";
pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const OPENROUTER_HTTP_REFERER: &str = "OPENROUTER_HTTP_REFERER";
pub const OPENROUTER_X_TITLE: &str = "OPENROUTER_X_TITLE";
pub const OPENROUTER_TIMEOUT: &str = "OPENROUTER_TIMEOUT";

/// Variables set by the end-to-end test harness.
const PLAYWRIGHT_VARS: [&str; 3] = ["PLAYWRIGHT", "PLAYWRIGHT_TEST_BASE_URL", "CI_PLAYWRIGHT"];

/// Which binding table is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Deterministic in-process doubles.
    Test,
    /// Real upstream models.
    #[default]
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Complete routing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Active binding table.
    pub environment: Environment,
    /// Upstream endpoint used by the production table.
    pub openrouter: OpenAICompatibleConfig,
}

impl InferenceConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = match var(TEKIR_ENV) {
            Some(value) => value.parse()?,
            None if PLAYWRIGHT_VARS.into_iter().any(|name| var(name).is_some()) => {
                debug!("Playwright variable set, selecting test environment");
                Environment::Test
            }
            None => Environment::default(),
        };

        let defaults = OpenAICompatibleConfig::default();
        let timeout_seconds = match var(OPENROUTER_TIMEOUT) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: OPENROUTER_TIMEOUT,
                    value,
                })?,
            None => REQUEST_TIMEOUT_SECS,
        };

        let openrouter = OpenAICompatibleConfig {
            name: defaults.name,
            base_url: var(OPENROUTER_BASE_URL).unwrap_or(defaults.base_url),
            api_key: var(OPENROUTER_API_KEY),
            http_referer: var(OPENROUTER_HTTP_REFERER).or(defaults.http_referer),
            x_title: var(OPENROUTER_X_TITLE).or(defaults.x_title),
            timeout_seconds,
        };

        info!(
            environment = %environment,
            base_url = %openrouter.base_url,
            api_key_set = openrouter.api_key.is_some(),
            "Loaded inference configuration"
        );

        Ok(Self {
            environment,
            openrouter,
        })
    }

    /// Validate the configuration for the active environment.
    pub fn validate(&self) -> ConfigResult<()> {
        let base_url = &self.openrouter.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "OpenRouter base_url must start with http:// or https://, got: {}",
                base_url
            )));
        }

        if self.openrouter.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "OpenRouter timeout must be greater than zero".to_string(),
            ));
        }

        if self.environment == Environment::Production
            && self
                .openrouter
                .api_key
                .as_deref()
                .map_or(true, |key| key.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "{} is required in production",
                OPENROUTER_API_KEY
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!(
            "PRODUCTION".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Test.to_string(), "test");
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = InferenceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config, InferenceConfig::default());
        assert_eq!(config.openrouter.timeout_seconds, 300);
    }

    #[test]
    fn test_explicit_environment() {
        let config = InferenceConfig::from_lookup(lookup(&[("TEKIR_ENV", "test")])).unwrap();
        assert_eq!(config.environment, Environment::Test);
    }

    #[test]
    fn test_playwright_selects_test() {
        for name in PLAYWRIGHT_VARS {
            let config = InferenceConfig::from_lookup(lookup(&[(name, "1")])).unwrap();
            assert_eq!(config.environment, Environment::Test, "{}", name);
        }
    }

    #[test]
    fn test_explicit_environment_wins_over_playwright() {
        let config = InferenceConfig::from_lookup(lookup(&[
            ("TEKIR_ENV", "production"),
            ("PLAYWRIGHT", "true"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_invalid_environment_rejected() {
        let err = InferenceConfig::from_lookup(lookup(&[("TEKIR_ENV", "dev")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvironment(_)));
    }

    #[test]
    fn test_openrouter_overrides() {
        let config = InferenceConfig::from_lookup(lookup(&[
            ("OPENROUTER_BASE_URL", "http://localhost:9000/v1"),
            ("OPENROUTER_API_KEY", "sk-or-test"),
            ("OPENROUTER_HTTP_REFERER", "https://example.com"),
            ("OPENROUTER_X_TITLE", "Example"),
            ("OPENROUTER_TIMEOUT", "30"),
        ]))
        .unwrap();
        assert_eq!(config.openrouter.base_url, "http://localhost:9000/v1");
        assert_eq!(config.openrouter.api_key.as_deref(), Some("sk-or-test"));
        assert_eq!(
            config.openrouter.http_referer.as_deref(),
            Some("https://example.com")
        );
        assert_eq!(config.openrouter.x_title.as_deref(), Some("Example"));
        assert_eq!(config.openrouter.timeout_seconds, 30);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = InferenceConfig::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "  "),
            ("OPENROUTER_BASE_URL", ""),
        ]))
        .unwrap();
        assert!(config.openrouter.api_key.is_none());
        assert_eq!(config.openrouter.base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let err =
            InferenceConfig::from_lookup(lookup(&[("OPENROUTER_TIMEOUT", "soon")])).unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_TIMEOUT"));
    }

    #[test]
    fn test_production_requires_api_key() {
        let config = InferenceConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_test_environment_needs_no_api_key() {
        let config = InferenceConfig {
            environment: Environment::Test,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = InferenceConfig::default();
        config.openrouter.api_key = Some("sk-or-test".to_string());
        config.openrouter.base_url = "openrouter.ai/api/v1".to_string();
        assert!(config.validate().is_err());

        config.openrouter.base_url = "https://openrouter.ai/api/v1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_error_converts_to_core_error() {
        let err: tekir_core::Error = ConfigError::Validation("bad".to_string()).into();
        assert!(err.is_configuration_defect());
    }
}
