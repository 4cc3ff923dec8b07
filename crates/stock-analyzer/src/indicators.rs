//! Derived columns: daily returns and trailing moving averages

use crate::config::DataSource;
use crate::series::{PriceRow, PriceSeries};
use chrono::NaiveDate;
use serde::Serialize;
use ta::{Next, indicators::SimpleMovingAverage};

/// Trailing window of the short moving average
pub const SHORT_WINDOW: usize = 50;

/// Trailing window of the long moving average
pub const LONG_WINDOW: usize = 200;

/// A price row with its derived values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    #[serde(flatten)]
    pub price: PriceRow,
    /// Percent change of adjusted close versus the previous row
    pub daily_return: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
}

impl DerivedRow {
    pub fn date(&self) -> NaiveDate {
        self.price.date
    }

    pub fn adjusted_close(&self) -> f64 {
        self.price.adjusted_close
    }
}

/// A price series extended with derived columns; read-only once built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries {
    symbol: String,
    source: DataSource,
    rows: Vec<DerivedRow>,
}

impl DerivedSeries {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(DerivedRow::date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(DerivedRow::date)
    }

    pub fn adjusted_closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(DerivedRow::adjusted_close)
    }

    /// Defined daily returns, in row order
    pub fn daily_returns(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().filter_map(|r| r.daily_return)
    }
}

/// Compute daily returns and the 50/200 row moving averages.
///
/// Pure: the same input always yields the same output. Windows longer than the
/// series leave their column undefined for every row.
pub fn derive(series: &PriceSeries) -> DerivedSeries {
    let closes: Vec<f64> = series.adjusted_closes().collect();
    let returns = daily_returns(&closes);
    let ma_50 = rolling_mean(&closes, SHORT_WINDOW);
    let ma_200 = rolling_mean(&closes, LONG_WINDOW);

    let rows = series
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| DerivedRow {
            price: row.clone(),
            daily_return: returns[i],
            ma_50: ma_50[i],
            ma_200: ma_200[i],
        })
        .collect();

    DerivedSeries {
        symbol: series.symbol().to_string(),
        source: series.source(),
        rows,
    }
}

/// Percent change versus the previous value; `None` for the first value and
/// after a zero price.
pub fn daily_returns(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if !values.is_empty() {
        out.push(None);
    }
    out.extend(values.windows(2).map(|w| {
        let (prev, cur) = (w[0], w[1]);
        (prev != 0.0).then(|| (cur - prev) / prev * 100.0)
    }));
    out
}

/// Trailing simple moving average, `None` until `window` values are available
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let Ok(mut sma) = SimpleMovingAverage::new(window) else {
        return vec![None; values.len()];
    };

    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let mean = sma.next(v);
            (i + 1 >= window).then_some(mean)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::fixtures::series_from_closes;

    fn ramp(len: usize) -> Vec<f64> {
        (1..=len).map(|v| v as f64).collect()
    }

    #[test]
    fn test_three_row_example() {
        let derived = derive(&series_from_closes(&[100.0, 102.0, 101.0]));
        let returns: Vec<Option<f64>> = derived.rows().iter().map(|r| r.daily_return).collect();

        assert_eq!(returns[0], None);
        assert!((returns[1].unwrap() - 2.0).abs() < 1e-9);
        assert!((returns[2].unwrap() - (-0.980_392_156_862_745)).abs() < 1e-9);
        assert!(derived.rows().iter().all(|r| r.ma_50.is_none() && r.ma_200.is_none()));
    }

    #[test]
    fn test_single_row() {
        let derived = derive(&series_from_closes(&[42.0]));
        let row = &derived.rows()[0];
        assert_eq!(row.daily_return, None);
        assert_eq!(row.ma_50, None);
        assert_eq!(row.ma_200, None);
    }

    #[test]
    fn test_moving_average_definedness() {
        for len in [1, 49, 50, 51, 199, 200, 250] {
            let derived = derive(&series_from_closes(&ramp(len)));
            for (i, row) in derived.rows().iter().enumerate() {
                assert_eq!(row.ma_50.is_some(), i >= 49, "ma_50 len={len} i={i}");
                assert_eq!(row.ma_200.is_some(), i >= 199, "ma_200 len={len} i={i}");
                assert_eq!(row.daily_return.is_some(), i >= 1, "return len={len} i={i}");
            }
        }
    }

    #[test]
    fn test_moving_average_values() {
        let derived = derive(&series_from_closes(&ramp(250)));
        let rows = derived.rows();

        // mean of 1..=50
        assert!((rows[49].ma_50.unwrap() - 25.5).abs() < 1e-9);
        // mean of 201..=250
        assert!((rows[249].ma_50.unwrap() - 225.5).abs() < 1e-9);
        // mean of 1..=200
        assert!((rows[199].ma_200.unwrap() - 100.5).abs() < 1e-9);
        // mean of 51..=250
        assert!((rows[249].ma_200.unwrap() - 150.5).abs() < 1e-9);
    }

    #[test]
    fn test_derive_is_idempotent() {
        let series = series_from_closes(&ramp(210));
        assert_eq!(derive(&series), derive(&series));
    }

    #[test]
    fn test_zero_previous_close_has_no_return() {
        let returns = daily_returns(&[0.0, 5.0, 10.0]);
        assert_eq!(returns[1], None);
        assert!((returns[2].unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_mean_zero_window() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }
}
