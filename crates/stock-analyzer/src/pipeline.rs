//! Fetch, derive, report, plot: the fixed run sequence

use crate::chart::{ChartRenderer, SvgChartRenderer};
use crate::config::{DataSource, StockConfig};
use crate::error::{Result, StockError};
use crate::indicators::derive;
use crate::provider::{PriceProvider, build_provider, fetch_with_retry};
use crate::report::{StatisticsReport, summarize};
use chrono::{Local, Months, NaiveDate};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Lookback used when no start date is given
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 12;

/// What to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub ticker: String,
    /// Inclusive; defaults to [`DEFAULT_LOOKBACK_MONTHS`] before `end`
    pub start: Option<NaiveDate>,
    /// Inclusive; defaults to today
    pub end: Option<NaiveDate>,
    pub source: DataSource,
    pub no_plot: bool,
    /// Defaults to `<TICKER>_chart.svg`
    pub chart_path: Option<PathBuf>,
}

impl AnalysisRequest {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            start: None,
            end: None,
            source: DataSource::default(),
            no_plot: false,
            chart_path: None,
        }
    }

    pub fn start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    pub fn no_plot(mut self, no_plot: bool) -> Self {
        self.no_plot = no_plot;
        self
    }

    pub fn chart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_path = Some(path.into());
        self
    }

    /// Upper-cased, trimmed ticker
    pub fn symbol(&self) -> String {
        self.ticker.trim().to_uppercase()
    }

    /// Resolve the inclusive date range relative to `today` and validate it
    pub fn date_range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let end = self.end.unwrap_or(today);
        let start = match self.start {
            Some(start) => start,
            None => end
                .checked_sub_months(Months::new(DEFAULT_LOOKBACK_MONTHS))
                .ok_or_else(|| StockError::ValidationError(format!("end date {end} out of range")))?,
        };

        if start > end {
            return Err(StockError::ValidationError(format!(
                "start date {start} is after end date {end}"
            )));
        }

        Ok((start, end))
    }

    /// Check the ticker and date range
    pub fn validate(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let symbol = self.symbol();
        if symbol.is_empty() {
            return Err(StockError::ValidationError("ticker must not be empty".to_string()));
        }
        if symbol.chars().any(char::is_whitespace) {
            return Err(StockError::ValidationError(format!(
                "ticker '{symbol}' must not contain whitespace"
            )));
        }
        self.date_range(today)
    }

    fn resolved_chart_path(&self) -> PathBuf {
        self.chart_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_chart.svg", self.symbol())))
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: StatisticsReport,
    /// Written chart, if plotting ran and succeeded
    pub chart: Option<PathBuf>,
    /// Plotting failure; statistics were already written when this is set
    pub render_error: Option<String>,
}

/// Runs one analysis: validate, fetch, derive, summarize, plot
pub struct Orchestrator {
    config: StockConfig,
    providers: HashMap<DataSource, Arc<dyn PriceProvider>>,
    renderer: Arc<dyn ChartRenderer>,
}

impl Orchestrator {
    /// Orchestrator using the built-in providers and the SVG renderer
    pub fn new(config: StockConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    fn provider_for(&self, source: DataSource) -> Result<Arc<dyn PriceProvider>> {
        match self.providers.get(&source) {
            Some(provider) => Ok(Arc::clone(provider)),
            None => build_provider(source, &self.config),
        }
    }

    /// Run the full sequence, writing the statistics report to `out`.
    ///
    /// Nothing is written unless the fetch succeeded. A plotting failure is
    /// logged and returned in [`RunOutcome::render_error`] instead of failing
    /// the run.
    pub async fn run(&self, request: &AnalysisRequest, out: &mut dyn Write) -> Result<RunOutcome> {
        self.run_on(request, Local::now().date_naive(), out).await
    }

    /// [`Orchestrator::run`] with an explicit "today" for default ranges
    pub async fn run_on(
        &self,
        request: &AnalysisRequest,
        today: NaiveDate,
        out: &mut dyn Write,
    ) -> Result<RunOutcome> {
        let (start, end) = request.validate(today)?;
        self.config.validate_for(request.source)?;

        let symbol = request.symbol();
        info!(symbol = %symbol, source = %request.source, %start, %end, "starting analysis");

        let provider = self.provider_for(request.source)?;
        let series = fetch_with_retry(provider.as_ref(), &self.config, &symbol, start, end).await?;

        let derived = derive(&series);
        let report = summarize(&derived);
        writeln!(out, "{report}")?;
        out.flush()?;

        if request.no_plot {
            info!(symbol = %symbol, "plotting disabled");
            return Ok(RunOutcome {
                report,
                chart: None,
                render_error: None,
            });
        }

        let path = request.resolved_chart_path();
        match self.renderer.render(&derived, &path) {
            Ok(()) => Ok(RunOutcome {
                report,
                chart: Some(path),
                render_error: None,
            }),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "chart rendering failed");
                Ok(RunOutcome {
                    report,
                    chart: None,
                    render_error: Some(e.to_string()),
                })
            },
        }
    }
}

/// Builder for [`Orchestrator`]
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: Option<StockConfig>,
    providers: HashMap<DataSource, Arc<dyn PriceProvider>>,
    renderer: Option<Arc<dyn ChartRenderer>>,
}

impl OrchestratorBuilder {
    pub fn config(mut self, config: StockConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use `provider` for its source instead of the built-in one
    pub fn provider(mut self, provider: Arc<dyn PriceProvider>) -> Self {
        self.providers.insert(provider.source(), provider);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            config: self.config.unwrap_or_default(),
            providers: self.providers,
            renderer: self
                .renderer
                .unwrap_or_else(|| Arc::new(SvgChartRenderer::default())),
        }
    }
}
