//! Alpha Vantage price provider
//!
//! Uses the `TIME_SERIES_DAILY_ADJUSTED` endpoint with `outputsize=full` and
//! filters the full history down to the requested range locally.

use crate::config::DataSource;
use crate::error::{Result, StockError};
use crate::provider::PriceProvider;
use crate::series::{PriceRow, PriceSeries};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROVIDER: &str = "Alpha Vantage";
const DAILY_ADJUSTED: &str = "TIME_SERIES_DAILY_ADJUSTED";

/// Alpha Vantage price provider
#[derive(Debug, Clone)]
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

/// TIME_SERIES_DAILY_ADJUSTED response
#[derive(Debug, Deserialize)]
struct DailyAdjustedResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, DailyAdjustedBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyAdjustedBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. adjusted close")]
    adjusted_close: String,
    #[serde(rename = "6. volume")]
    volume: String,
}

impl AlphaVantageProvider {
    /// Create a provider for `base_url` with a per-request timeout
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.to_string(),
        })
    }

    async fn fetch_body(&self, ticker: &str) -> Result<String> {
        let params = [
            ("function", DAILY_ADJUSTED),
            ("symbol", ticker),
            ("outputsize", "full"),
            ("apikey", self.api_key.as_str()),
        ];

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StockError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }

        if status.is_server_error() {
            return Err(StockError::fetch(PROVIDER, format!("HTTP error: {status}")));
        }

        if !status.is_success() {
            return Err(StockError::ProviderRejected {
                provider: PROVIDER.to_string(),
                message: format!("HTTP error: {status}"),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    fn source(&self) -> DataSource {
        DataSource::AlphaVantage
    }

    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let body = self.fetch_body(ticker).await?;
        debug!(symbol = ticker, bytes = body.len(), "received Alpha Vantage payload");

        let series = parse_daily_adjusted(ticker, &body, start, end)?;
        info!(symbol = ticker, rows = series.len(), "fetched Alpha Vantage price history");
        Ok(series)
    }
}

/// Parse a daily-adjusted payload into a series covering `[start, end]`
pub(crate) fn parse_daily_adjusted(
    ticker: &str,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries> {
    let response: DailyAdjustedResponse = serde_json::from_str(body)?;
    check_api_error(ticker, &response)?;

    let series = response.time_series.ok_or_else(|| {
        StockError::malformed(PROVIDER, "response did not contain \"Time Series (Daily)\"")
    })?;

    let mut rows = Vec::new();
    for (day, bar) in &series {
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| StockError::malformed(PROVIDER, format!("bad date '{day}': {e}")))?;
        if date < start || date > end {
            continue;
        }
        rows.push(bar.to_row(date)?);
    }

    PriceSeries::new(ticker, DataSource::AlphaVantage, rows)
}

fn check_api_error(ticker: &str, response: &DailyAdjustedResponse) -> Result<()> {
    if let Some(msg) = &response.error_message {
        if msg.contains("Invalid API call") || msg.contains("not found") {
            return Err(StockError::SymbolNotFound(ticker.to_string()));
        }
        return Err(StockError::ProviderRejected {
            provider: PROVIDER.to_string(),
            message: msg.clone(),
        });
    }

    for msg in [&response.note, &response.information].into_iter().flatten() {
        let lower = msg.to_ascii_lowercase();
        if lower.contains("call frequency") || lower.contains("rate limit") {
            return Err(StockError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }
        if response.time_series.is_none() {
            return Err(StockError::ProviderRejected {
                provider: PROVIDER.to_string(),
                message: msg.clone(),
            });
        }
        warn!("Alpha Vantage notice: {}", msg);
    }

    Ok(())
}

impl DailyAdjustedBar {
    fn to_row(&self, date: NaiveDate) -> Result<PriceRow> {
        let num = |field: &str, raw: &str| {
            raw.trim().parse::<f64>().map_err(|_| {
                StockError::malformed(PROVIDER, format!("bad {field} value '{raw}' on {date}"))
            })
        };

        let volume = self.volume.trim().parse::<u64>().map_err(|_| {
            StockError::malformed(PROVIDER, format!("bad volume value '{}' on {date}", self.volume))
        })?;

        Ok(PriceRow {
            date,
            open: num("open", &self.open)?,
            high: num("high", &self.high)?,
            low: num("low", &self.low)?,
            close: num("close", &self.close)?,
            adjusted_close: num("adjusted close", &self.adjusted_close)?,
            volume,
        })
    }
}
