//! Closing-price chart

use crate::error::{Result, StockError};
use crate::series::PriceSeries;
use chrono::Days;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const CHART_SIZE: (u32, u32) = (1200, 600);

/// Renders a series to an image and returns where it was written
#[cfg_attr(test, mockall::automock)]
pub trait ChartRenderer: Send + Sync {
    fn render(&self, series: &PriceSeries, company: &str) -> Result<PathBuf>;
}

/// Line chart of closing price over date, written as `<SYMBOL>_chart.svg`
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    dir: PathBuf,
}

impl SvgChartRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_chart.svg"))
    }
}

/// Chart title for a company and symbol
pub fn chart_title(company: &str, symbol: &str) -> String {
    format!("{company} ({symbol}) Stock Closing Price - Past Year")
}

fn chart_err(err: impl std::fmt::Display) -> StockError {
    StockError::Chart(err.to_string())
}

impl ChartRenderer for SvgChartRenderer {
    #[instrument(skip(self, series), fields(symbol = series.symbol()))]
    fn render(&self, series: &PriceSeries, company: &str) -> Result<PathBuf> {
        let path = self.path_for(series.symbol());
        draw_closing_prices(&path, series, company)?;
        debug!(path = %path.display(), "Chart written");
        Ok(path)
    }
}

fn draw_closing_prices(path: &Path, series: &PriceSeries, company: &str) -> Result<()> {
    let first = series.first().date;
    // A one-day range has no width to draw on.
    let last = if series.len() == 1 {
        first.checked_add_days(Days::new(1)).unwrap_or(first)
    } else {
        series.last().date
    };

    let (low, high) = series
        .bars()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.close), hi.max(b.close))
        });
    let pad = ((high - low) * 0.05).max(1.0);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(chart_title(company, series.symbol()), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(first..last, (low - pad)..(high + pad))
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Closing Price (USD)")
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.3))
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(
            series.bars().iter().map(|b| (b.date, b.close)),
            BLUE.stroke_width(2),
        ))
        .map_err(chart_err)?
        .label("Closing Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)
}
