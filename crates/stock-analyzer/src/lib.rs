//! Single-ticker price history analysis
//!
//! This crate fetches daily OHLCV history for one ticker from Yahoo Finance or
//! Alpha Vantage, derives daily returns and 50/200-day moving averages, prints
//! summary statistics and optionally writes an SVG chart.
//!
//! # Architecture
//!
//! A run always goes through the same steps, driven by [`Orchestrator`]:
//! - [`PriceProvider`]: fetches rows and normalizes them into a [`PriceSeries`]
//!   (`YahooProvider`, `AlphaVantageProvider`)
//! - [`indicators::derive`]: adds daily return and moving-average columns
//! - [`report::summarize`]: count/mean/std/quartiles for adjusted close and returns
//! - [`ChartRenderer`]: draws adjusted close and moving averages
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_analyzer::{AnalysisRequest, Orchestrator, StockConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::default().with_env_api_key();
//!     let orchestrator = Orchestrator::new(config);
//!
//!     let request = AnalysisRequest::new("AAPL").no_plot(true);
//!     orchestrator.run(&request, &mut std::io::stdout()).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod indicators;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod series;

// Re-export main types for convenience
pub use api::{AlphaVantageProvider, YahooProvider};
pub use chart::{ChartRenderer, SvgChartRenderer};
pub use config::{DataSource, StockConfig};
pub use error::{Result, StockError};
pub use indicators::{DerivedRow, DerivedSeries, derive};
pub use pipeline::{AnalysisRequest, Orchestrator, OrchestratorBuilder, RunOutcome};
pub use provider::{PriceProvider, build_provider, fetch_with_retry};
pub use report::{ColumnStats, StatisticsReport, summarize};
pub use series::{PriceRow, PriceSeries};
