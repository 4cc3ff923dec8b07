//! Configuration for stock analysis operations

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Environment variables checked, in order, for the Alpha Vantage API key
pub const ALPHA_VANTAGE_KEY_VARS: [&str; 2] = ["ALPHA_VANTAGE_API_KEY", "AV_API_KEY"];

/// Alpha Vantage query endpoint
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Data provider for price history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Yahoo Finance (default, no API key required)
    #[default]
    Yahoo,
    /// Alpha Vantage (requires API key)
    #[serde(rename = "alpha")]
    AlphaVantage,
}

impl DataSource {
    /// Human readable provider name used in logs and errors
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Yahoo => "Yahoo Finance",
            Self::AlphaVantage => "Alpha Vantage",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for DataSource {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "alpha" | "alphavantage" | "alpha_vantage" => Ok(Self::AlphaVantage),
            other => Err(StockError::ValidationError(format!(
                "unknown source '{other}' (expected 'yahoo' or 'alpha')"
            ))),
        }
    }
}

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Total attempts per fetch, including the first one
    pub max_attempts: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Alpha Vantage API key (optional)
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage endpoint
    pub alpha_vantage_base_url: String,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_base: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            alpha_vantage_api_key: None,
            alpha_vantage_base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Load Alpha Vantage API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = api_key_from_env() {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(StockError::ConfigError(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the configuration for a specific data source
    pub fn validate_for(&self, source: DataSource) -> Result<()> {
        self.validate()?;

        if source == DataSource::AlphaVantage && self.alpha_vantage_key().is_none() {
            return Err(StockError::ConfigError(format!(
                "Alpha Vantage selected but no API key configured (set {})",
                ALPHA_VANTAGE_KEY_VARS[0]
            )));
        }

        Ok(())
    }

    /// Alpha Vantage key, ignoring blank values
    pub fn alpha_vantage_key(&self) -> Option<&str> {
        self.alpha_vantage_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Get retry backoff duration for attempt number; saturates instead of overflowing
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base
            .saturating_mul(2_u32.checked_pow(attempt).unwrap_or(u32::MAX))
    }
}

fn api_key_from_env() -> Option<String> {
    ALPHA_VANTAGE_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    max_attempts: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_base_url: Option<String>,
}

impl StockConfigBuilder {
    /// Set total attempts per fetch
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Override the Alpha Vantage endpoint
    pub fn alpha_vantage_base_url(mut self, url: impl Into<String>) -> Self {
        self.alpha_vantage_base_url = Some(url.into());
        self
    }

    /// Load Alpha Vantage API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = api_key_from_env() {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_base_url: self
                .alpha_vantage_base_url
                .unwrap_or(defaults.alpha_vantage_base_url),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
        assert!(config.validate_for(DataSource::Yahoo).is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .max_attempts(5)
            .request_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_rejects_zero_attempts() {
        let result = StockConfig::builder().max_attempts(0).build();
        assert!(matches!(result, Err(StockError::ConfigError(_))));
    }

    #[test]
    fn test_validation_alpha_vantage_no_key() {
        let config = StockConfig {
            alpha_vantage_api_key: None,
            ..Default::default()
        };

        assert!(matches!(
            config.validate_for(DataSource::AlphaVantage),
            Err(StockError::ConfigError(_))
        ));
    }

    #[test]
    fn test_validation_alpha_vantage_blank_key() {
        let config = StockConfig {
            alpha_vantage_api_key: Some("   ".to_string()),
            ..Default::default()
        };

        assert!(config.validate_for(DataSource::AlphaVantage).is_err());
    }

    #[test]
    fn test_validation_alpha_vantage_with_key() {
        let config = StockConfig {
            alpha_vantage_api_key: Some("test_key".to_string()),
            ..Default::default()
        };

        assert!(config.validate_for(DataSource::AlphaVantage).is_ok());
    }

    #[test]
    fn test_retry_backoff() {
        let config = StockConfig::default();
        assert_eq!(config.retry_backoff(0), Duration::from_secs(1));
        assert_eq!(config.retry_backoff(1), Duration::from_secs(2));
        assert_eq!(config.retry_backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_retry_backoff_large_attempt_saturates() {
        let config = StockConfig::builder().max_attempts(100).build().unwrap();
        assert_eq!(config.retry_backoff(32), Duration::from_secs(u64::from(u32::MAX)));
        assert_eq!(config.retry_backoff(99), Duration::from_secs(u64::from(u32::MAX)));

        let huge = StockConfig::builder()
            .retry_backoff_base(Duration::MAX)
            .build()
            .unwrap();
        assert_eq!(huge.retry_backoff(5), Duration::MAX);
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("yahoo".parse::<DataSource>().unwrap(), DataSource::Yahoo);
        assert_eq!("Alpha".parse::<DataSource>().unwrap(), DataSource::AlphaVantage);
        assert!(matches!(
            "bloomberg".parse::<DataSource>(),
            Err(StockError::ValidationError(_))
        ));
    }
}
