//! Price provider capability and the retry loop wrapped around it

use crate::api::{AlphaVantageProvider, YahooProvider};
use crate::config::{DataSource, StockConfig};
use crate::error::{Result, StockError};
use crate::series::PriceSeries;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

/// Anything that can return daily price history for a ticker.
///
/// Implementations must return rows for the inclusive `[start, end]` range in
/// the normalized [`PriceSeries`] shape, and fail rather than return an empty
/// series.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Which upstream this provider talks to
    fn source(&self) -> DataSource;

    /// Fetch daily rows for `ticker` between `start` and `end`, both inclusive
    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;
}

/// Build the provider for `source`.
///
/// Fails with [`StockError::ConfigError`] before any network activity when the
/// source needs a credential that is not configured.
pub fn build_provider(source: DataSource, config: &StockConfig) -> Result<Arc<dyn PriceProvider>> {
    config.validate_for(source)?;

    let provider: Arc<dyn PriceProvider> = match source {
        DataSource::Yahoo => Arc::new(YahooProvider::new()),
        DataSource::AlphaVantage => {
            let key = config.alpha_vantage_key().ok_or_else(|| {
                StockError::ConfigError("Alpha Vantage API key missing".to_string())
            })?;
            Arc::new(AlphaVantageProvider::new(
                key,
                &config.alpha_vantage_base_url,
                config.request_timeout,
            )?)
        },
    };

    Ok(provider)
}

/// Call `provider.fetch` with a per-attempt timeout and bounded exponential
/// backoff.
///
/// Only errors reporting [`StockError::is_retryable`] are retried; an unknown
/// symbol or an empty result fails on the first attempt.
pub async fn fetch_with_retry(
    provider: &dyn PriceProvider,
    config: &StockConfig,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries> {
    let source = provider.source();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        debug!(symbol = ticker, %source, attempt, "fetching price history");

        let result = tokio::time::timeout(config.request_timeout, provider.fetch(ticker, start, end))
            .await
            .unwrap_or_else(|_| {
                Err(StockError::Timeout {
                    provider: source.display_name().to_string(),
                })
            });

        match result {
            Ok(series) => return Ok(series),
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                let delay = config.retry_backoff(attempt - 1);
                warn!(
                    symbol = ticker,
                    %source,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            },
            Err(e) => return Err(e),
        }
    }
}
