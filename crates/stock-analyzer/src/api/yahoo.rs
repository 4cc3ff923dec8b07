//! Yahoo Finance price provider

use crate::config::DataSource;
use crate::error::{Result, StockError};
use crate::provider::PriceProvider;
use crate::series::{PriceRow, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate};
use time::OffsetDateTime;
use tracing::{debug, info};
use yahoo_finance_api::{self as yahoo, YahooError};

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance price provider; needs no credential
#[derive(Debug, Clone, Default)]
pub struct YahooProvider {}

impl YahooProvider {
    /// Create a new Yahoo Finance provider
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl PriceProvider for YahooProvider {
    fn source(&self) -> DataSource {
        DataSource::Yahoo
    }

    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let connector = yahoo::YahooConnector::new().map_err(|e| classify_error(ticker, e))?;

        let (start_odt, end_odt) = request_window(start, end)?;

        let response = connector
            .get_quote_history(ticker, start_odt, end_odt)
            .await
            .map_err(|e| classify_error(ticker, e))?;

        let quotes = response.quotes().map_err(|e| classify_error(ticker, e))?;
        let gmtoffset = response
            .metadata()
            .map_err(|e| classify_error(ticker, e))?
            .gmtoffset;

        debug!(symbol = ticker, quotes = quotes.len(), gmtoffset, "received Yahoo quotes");

        let rows = quotes_to_rows(&quotes, gmtoffset, start, end);
        let series = PriceSeries::new(ticker, DataSource::Yahoo, rows)?;
        info!(symbol = ticker, rows = series.len(), "fetched Yahoo price history");
        Ok(series)
    }
}

/// UTC bounds wide enough to hold every bar dated `[start, end]` on the
/// exchange's calendar. The end bound is exclusive upstream, and bars east of
/// UTC open on the previous UTC day, so one day is added on each side.
fn request_window(start: NaiveDate, end: NaiveDate) -> Result<(OffsetDateTime, OffsetDateTime)> {
    let to_odt = |date: NaiveDate| {
        let secs = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| StockError::ValidationError(format!("invalid date {date}")))?;
        OffsetDateTime::from_unix_timestamp(secs)
            .map_err(|e| StockError::ValidationError(format!("invalid date {date}: {e}")))
    };

    let padded_start = start
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| StockError::ValidationError(format!("start date {start} out of range")))?;
    let exclusive_end = end
        .checked_add_days(Days::new(1))
        .ok_or_else(|| StockError::ValidationError(format!("end date {end} out of range")))?;

    Ok((to_odt(padded_start)?, to_odt(exclusive_end)?))
}

/// Quotes dated on the exchange's calendar and limited to `[start, end]`.
///
/// Bars are stamped at the local session open, so `gmtoffset` (seconds east
/// of UTC) is applied before taking the date.
fn quotes_to_rows(
    quotes: &[yahoo::Quote],
    gmtoffset: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<PriceRow> {
    quotes
        .iter()
        .filter_map(|q| {
            let local = q.timestamp.checked_add(i64::from(gmtoffset))?;
            let date = DateTime::from_timestamp(local, 0)?.date_naive();
            Some(PriceRow {
                date,
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                adjusted_close: q.adjclose,
                volume: q.volume,
            })
        })
        .filter(|r| r.date >= start && r.date <= end)
        .collect()
}

fn classify_error(ticker: &str, error: YahooError) -> StockError {
    match error {
        YahooError::ApiError(_) => StockError::SymbolNotFound(ticker.to_string()),
        YahooError::NoQuotes | YahooError::NoResult => StockError::EmptySeries {
            symbol: ticker.to_string(),
        },
        YahooError::TooManyRequests(_) => StockError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        },
        e @ (YahooError::DeserializeFailed(_)
        | YahooError::DeserializeFailedDebug(_)
        | YahooError::DataInconsistency
        | YahooError::MissingField(_)) => StockError::malformed(PROVIDER, e),
        e => StockError::fetch(PROVIDER, e),
    }
}
