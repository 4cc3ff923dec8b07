//! Price and moving-average chart rendering

use crate::error::{Result, StockError};
use crate::indicators::{DerivedRow, DerivedSeries};
use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// Draws a derived series to a file
#[cfg_attr(test, mockall::automock)]
pub trait ChartRenderer: Send + Sync {
    /// Render `series` to `output`
    fn render(&self, series: &DerivedSeries, output: &Path) -> Result<()>;
}

/// One plotted line
struct Line {
    label: &'static str,
    color: RGBColor,
    points: Vec<(NaiveDate, f64)>,
}

impl Line {
    fn collect(
        label: &'static str,
        color: RGBColor,
        series: &DerivedSeries,
        value: fn(&DerivedRow) -> Option<f64>,
    ) -> Self {
        let points = series
            .rows()
            .iter()
            .filter_map(|row| value(row).map(|v| (row.date(), v)))
            .collect();
        Self { label, color, points }
    }
}

/// Writes an SVG line chart of adjusted close, MA-50 and MA-200
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    width: u32,
    height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
        }
    }
}

impl SvgChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn lines(series: &DerivedSeries) -> Vec<Line> {
        vec![
            Line::collect("Adj Close", BLUE, series, |r| Some(r.adjusted_close())),
            Line::collect("50-Day MA", RGBColor(255, 127, 14), series, |r| r.ma_50),
            Line::collect("200-Day MA", GREEN, series, |r| r.ma_200),
        ]
        .into_iter()
        // a window longer than the series has no line at all
        .filter(|line| !line.points.is_empty())
        .collect()
    }
}

fn render_err(e: impl std::fmt::Display) -> StockError {
    StockError::RenderError(e.to_string())
}

/// Padded value range; a flat series still gets a visible band
fn value_range(lines: &[Line]) -> (f64, f64) {
    let (lo, hi) = lines
        .iter()
        .flat_map(|l| l.points.iter().map(|&(_, v)| v))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if hi > lo {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, series: &DerivedSeries, output: &Path) -> Result<()> {
        let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
            return Err(StockError::RenderError("nothing to plot".to_string()));
        };

        let (x_start, x_end) = if first == last {
            (first - Days::new(1), last + Days::new(1))
        } else {
            (first, last)
        };

        let lines = Self::lines(series);
        let (y_min, y_max) = value_range(&lines);

        let root = SVGBackend::new(output, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{} | Price & Moving Averages", series.symbol()),
                ("sans-serif", 24),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_start..x_end, y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Price")
            .x_label_formatter(&|d| d.format("%Y-%m-%d").to_string())
            .draw()
            .map_err(render_err)?;

        for line in lines {
            let color = line.color;
            chart
                .draw_series(LineSeries::new(line.points, color.stroke_width(2)))
                .map_err(render_err)?
                .label(line.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!(symbol = series.symbol(), path = %output.display(), "chart written");
        Ok(())
    }
}
