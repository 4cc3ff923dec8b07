//! Command-line interface for stock-analyzer
//!
//! # Usage
//!
//! ```bash
//! # Yahoo Finance (default source), trailing year
//! stock-analyzer --ticker AAPL
//!
//! # Alpha Vantage, explicit range, no chart
//! export ALPHA_VANTAGE_API_KEY=your_key_here
//! stock-analyzer -t MSFT --source alpha --start 2023-01-01 --end 2024-01-01 --no-plot
//! ```

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use stock_analyzer::{AnalysisRequest, DataSource, Orchestrator, StockConfig, StockError};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Yahoo Finance, no API key needed
    Yahoo,
    /// Alpha Vantage, requires ALPHA_VANTAGE_API_KEY
    Alpha,
}

impl From<Source> for DataSource {
    fn from(source: Source) -> Self {
        match source {
            Source::Yahoo => DataSource::Yahoo,
            Source::Alpha => DataSource::AlphaVantage,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "stock-analyzer")]
#[command(about = "Fetch daily prices for a ticker, print summary stats and chart moving averages", long_about = None)]
struct Args {
    /// Ticker symbol, e.g. AAPL (case-insensitive)
    #[arg(short, long)]
    ticker: String,

    /// First day of the range, YYYY-MM-DD (default: one year before --end)
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Last day of the range, YYYY-MM-DD (default: today)
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    /// Data source
    #[arg(short, long, value_enum, default_value_t = Source::Yahoo)]
    source: Source,

    /// Skip plotting
    #[arg(long)]
    no_plot: bool,

    /// Where to write the SVG chart (default: <TICKER>_chart.svg)
    #[arg(long)]
    chart_path: Option<PathBuf>,
}

impl Args {
    fn into_request(self) -> AnalysisRequest {
        AnalysisRequest {
            ticker: self.ticker,
            start: self.start,
            end: self.end,
            source: self.source.into(),
            no_plot: self.no_plot,
            chart_path: self.chart_path,
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{value}': {e}"))
}

fn run(args: Args) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let config = StockConfig::default().with_env_api_key();
    let orchestrator = Orchestrator::new(config);
    let request = args.into_request();

    info!(ticker = %request.ticker, source = %request.source, "running analysis");

    let outcome = runtime.block_on(async {
        let mut stdout = io::stdout().lock();
        orchestrator.run(&request, &mut stdout).await
    })?;

    match (outcome.chart, outcome.render_error) {
        (Some(path), _) => eprintln!("chart written to {}", path.display()),
        (None, Some(err)) => eprintln!("warning: {err}"),
        (None, None) => {},
    }

    Ok(())
}

fn main() -> ExitCode {
    stock_utils::init_tracing();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err.downcast_ref::<StockError>().map_or(1, StockError::exit_code);
            ExitCode::from(code)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["stock-analyzer", "--ticker", "aapl"]).unwrap();
        let request = args.into_request();

        assert_eq!(request.ticker, "aapl");
        assert_eq!(request.source, DataSource::Yahoo);
        assert!(!request.no_plot);
        assert!(request.start.is_none());
        assert!(request.end.is_none());
    }

    #[test]
    fn test_full_arguments() {
        let args = Args::try_parse_from([
            "stock-analyzer",
            "-t",
            "MSFT",
            "--start",
            "2023-01-01",
            "--end",
            "2024-01-01",
            "--source",
            "alpha",
            "--no-plot",
        ])
        .unwrap();
        let request = args.into_request();

        assert_eq!(request.source, DataSource::AlphaVantage);
        assert!(request.no_plot);
        assert_eq!(request.start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(request.end, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_unknown_source_rejected() {
        let result = Args::try_parse_from(["stock-analyzer", "-t", "AAPL", "--source", "bloomberg"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_date_rejected() {
        let result = Args::try_parse_from(["stock-analyzer", "-t", "AAPL", "--start", "01/02/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ticker_required() {
        assert!(Args::try_parse_from(["stock-analyzer"]).is_err());
    }
}
