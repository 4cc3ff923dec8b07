//! Normalized daily price table shared by every provider

use crate::config::DataSource;
use crate::error::{Result, StockError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: u64,
}

/// Daily rows for one ticker from one provider, ascending by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    source: DataSource,
    rows: Vec<PriceRow>,
}

impl PriceSeries {
    /// Build a series from unordered rows.
    ///
    /// Rows are sorted by date. Duplicate dates and negative values are a
    /// provider inconsistency and an empty row set means the provider had
    /// nothing for the range; all three fail the fetch.
    pub fn new(symbol: impl Into<String>, source: DataSource, mut rows: Vec<PriceRow>) -> Result<Self> {
        let symbol = symbol.into();

        if rows.is_empty() {
            return Err(StockError::EmptySeries { symbol });
        }

        rows.sort_by_key(|r| r.date);

        if let Some(pair) = rows.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(StockError::malformed(
                source.display_name(),
                format!("duplicate row for {} on {}", symbol, pair[0].date),
            ));
        }

        if let Some(row) = rows.iter().find(|r| !r.is_valid()) {
            return Err(StockError::malformed(
                source.display_name(),
                format!("invalid price values for {} on {}", symbol, row.date),
            ));
        }

        Ok(Self { symbol, source, rows })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a constructed series
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn adjusted_closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.adjusted_close)
    }
}

impl PriceRow {
    fn is_valid(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.adjusted_close]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}
