//! Error types for stock analysis operations

use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Malformed user input (empty ticker, inverted date range, unknown source)
    #[error("Invalid input: {0}")]
    ValidationError(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Provider call failed
    #[error("{provider} error: {message}")]
    FetchError {
        provider: String,
        message: String,
    },

    /// Provider answered with data that cannot be used; repeating the call won't help
    #[error("{provider} returned malformed data: {message}")]
    MalformedResponse {
        provider: String,
        message: String,
    },

    /// Ticker not recognized by the provider
    #[error("Unknown symbol: {0}")]
    SymbolNotFound(String),

    /// Provider returned no rows for the requested range
    #[error("No price data returned for {symbol}")]
    EmptySeries {
        symbol: String,
    },

    /// Provider answered but refused the request (e.g. premium-only endpoint)
    #[error("{provider} rejected the request: {message}")]
    ProviderRejected {
        provider: String,
        message: String,
    },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Request did not complete within the configured timeout
    #[error("{provider} request timed out")]
    Timeout {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Chart could not be produced
    #[error("Render error: {0}")]
    RenderError(String),

    /// Failed to write the report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StockError {
    /// Build a [`StockError::FetchError`] for a provider
    pub fn fetch(provider: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::FetchError {
            provider: provider.into(),
            message: message.to_string(),
        }
    }

    /// Build a [`StockError::MalformedResponse`] for a provider
    pub fn malformed(provider: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            message: message.to_string(),
        }
    }

    /// Whether a later attempt of the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } | Self::Timeout { .. } => true,
            Self::NetworkError(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            },
            // transport failures and 5xx only
            Self::FetchError { .. } => true,
            _ => false,
        }
    }

    /// Whether the error comes from fetching data
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchError { .. }
                | Self::MalformedResponse { .. }
                | Self::SymbolNotFound(_)
                | Self::EmptySeries { .. }
                | Self::ProviderRejected { .. }
                | Self::RateLimitExceeded { .. }
                | Self::Timeout { .. }
                | Self::NetworkError(_)
                | Self::JsonError(_)
        )
    }

    /// Process exit code for this error class
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ValidationError(_) => 2,
            Self::ConfigError(_) => 3,
            e if e.is_fetch_failure() => 4,
            _ => 1,
        }
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::SymbolNotFound("INVALID".to_string());
        assert_eq!(err.to_string(), "Unknown symbol: INVALID");

        let err = StockError::fetch("Yahoo Finance", "connection reset");
        assert_eq!(err.to_string(), "Yahoo Finance error: connection reset");

        let err = StockError::EmptySeries {
            symbol: "AAPL".to_string(),
        };
        assert_eq!(err.to_string(), "No price data returned for AAPL");
    }

    #[test]
    fn test_retry_classification() {
        assert!(StockError::fetch("Alpha Vantage", "HTTP 503").is_retryable());
        assert!(
            StockError::RateLimitExceeded {
                provider: "Alpha Vantage".to_string()
            }
            .is_retryable()
        );
        assert!(!StockError::SymbolNotFound("ZZZZ".to_string()).is_retryable());
        assert!(
            !StockError::EmptySeries {
                symbol: "AAPL".to_string()
            }
            .is_retryable()
        );
        assert!(!StockError::ConfigError("missing key".to_string()).is_retryable());
        assert!(!StockError::malformed("Alpha Vantage", "bad close value").is_retryable());
        assert!(
            !StockError::ProviderRejected {
                provider: "Alpha Vantage".to_string(),
                message: "premium endpoint".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(StockError::ValidationError("x".into()).exit_code(), 2);
        assert_eq!(StockError::ConfigError("x".into()).exit_code(), 3);
        assert_eq!(StockError::SymbolNotFound("x".into()).exit_code(), 4);
        assert_eq!(
            StockError::Timeout {
                provider: "Yahoo Finance".into()
            }
            .exit_code(),
            4
        );
        assert_eq!(StockError::malformed("Yahoo Finance", "x").exit_code(), 4);
        assert_eq!(StockError::RenderError("x".into()).exit_code(), 1);
    }
}
