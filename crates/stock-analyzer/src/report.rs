//! Descriptive statistics of a derived series

use crate::config::DataSource;
use crate::indicators::DerivedSeries;
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table, presets};
use serde::Serialize;
use std::fmt;

/// count/mean/std/min/quartiles/max of one column, ignoring undefined values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); undefined below two values
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    /// Compute statistics over the finite values of `values`
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        if count == 0 {
            return Self {
                count,
                mean: None,
                std_dev: None,
                min: None,
                q25: None,
                median: None,
                q75: None,
                max: None,
            };
        }

        let n = count as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std_dev = (count > 1).then(|| {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        });

        Self {
            count,
            mean: Some(mean),
            std_dev,
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Linear interpolation between closest ranks over an ascending slice
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Summary statistics for the adjusted close and daily return columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub symbol: String,
    pub source: DataSource,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub rows: usize,
    pub adjusted_close: ColumnStats,
    pub daily_return: ColumnStats,
}

/// Summarize a derived series. Never mutates its input.
pub fn summarize(series: &DerivedSeries) -> StatisticsReport {
    StatisticsReport {
        symbol: series.symbol().to_string(),
        source: series.source(),
        first_date: series.first_date(),
        last_date: series.last_date(),
        rows: series.len(),
        adjusted_close: ColumnStats::from_values(series.adjusted_closes()),
        daily_return: ColumnStats::from_values(series.daily_returns()),
    }
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"))
}

impl StatisticsReport {
    /// Render the statistics grid
    pub fn to_table(&self) -> Table {
        let columns = [&self.adjusted_close, &self.daily_return];
        let lines: [(&str, fn(&ColumnStats) -> String); 8] = [
            ("count", |c| format!("{:.2}", c.count as f64)),
            ("mean", |c| fmt_value(c.mean)),
            ("std", |c| fmt_value(c.std_dev)),
            ("min", |c| fmt_value(c.min)),
            ("25%", |c| fmt_value(c.q25)),
            ("50%", |c| fmt_value(c.median)),
            ("75%", |c| fmt_value(c.q75)),
            ("max", |c| fmt_value(c.max)),
        ];

        let mut table = Table::new();
        table.load_preset(presets::ASCII_BORDERS_ONLY_CONDENSED);
        table.set_header(vec!["", "Adj Close", "Daily Return %"]);

        for (label, render) in lines {
            let mut row = vec![Cell::new(label)];
            row.extend(
                columns
                    .iter()
                    .map(|c| Cell::new(render(c)).set_alignment(CellAlignment::Right)),
            );
            table.add_row(row);
        }

        table
    }
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Summary Stats ===")?;
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => writeln!(
                f,
                "{} via {} | {} rows | {} to {}",
                self.symbol, self.source, self.rows, first, last
            )?,
            _ => writeln!(f, "{} via {} | {} rows", self.symbol, self.source, self.rows)?,
        }
        writeln!(f, "{}", self.to_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::derive;
    use crate::series::fixtures::series_from_closes;

    fn close_to(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < 1e-9)
    }

    #[test]
    fn test_column_stats_basic() {
        let stats = ColumnStats::from_values([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.count, 4);
        assert!(close_to(stats.mean, 2.5));
        // sample variance of 1..=4 is 5/3
        assert!(close_to(stats.std_dev, (5.0_f64 / 3.0).sqrt()));
        assert!(close_to(stats.min, 1.0));
        assert!(close_to(stats.q25, 1.75));
        assert!(close_to(stats.median, 2.5));
        assert!(close_to(stats.q75, 3.25));
        assert!(close_to(stats.max, 4.0));
    }

    #[test]
    fn test_column_stats_empty() {
        let stats = ColumnStats::from_values(std::iter::empty());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.max, None);
    }

    #[test]
    fn test_single_row_report() {
        let report = summarize(&derive(&series_from_closes(&[42.0])));

        assert_eq!(report.rows, 1);
        assert_eq!(report.adjusted_close.count, 1);
        assert!(close_to(report.adjusted_close.mean, 42.0));
        assert_eq!(report.adjusted_close.std_dev, None);
        assert!(close_to(report.adjusted_close.median, 42.0));
        assert_eq!(report.daily_return.count, 0);
    }

    #[test]
    fn test_daily_return_ignores_first_row() {
        let report = summarize(&derive(&series_from_closes(&[100.0, 102.0, 101.0])));
        assert_eq!(report.adjusted_close.count, 3);
        assert_eq!(report.daily_return.count, 2);
        assert!(close_to(report.daily_return.max, 2.0));
    }

    #[test]
    fn test_display_contains_columns() {
        let report = summarize(&derive(&series_from_closes(&[100.0, 102.0, 101.0])));
        let text = report.to_string();

        assert!(text.starts_with("=== Summary Stats ==="));
        assert!(text.contains("Adj Close"));
        assert!(text.contains("Daily Return %"));
        assert!(text.contains("101.00"));
        assert!(text.contains("2024-01-01 to 2024-01-03"));
    }

    #[test]
    fn test_display_undefined_values() {
        let report = summarize(&derive(&series_from_closes(&[42.0])));
        assert!(report.to_string().contains("NaN"));
    }

    #[test]
    fn test_summarize_does_not_mutate() {
        let derived = derive(&series_from_closes(&[1.0, 3.0, 2.0]));
        let before = derived.clone();
        let _ = summarize(&derived);
        assert_eq!(derived, before);
    }
}
