//! Textual digest of a price series
//!
//! The text generator never sees the raw series: it gets descriptive
//! statistics per numeric column plus the first and last rows, which keeps
//! the prompt size bounded regardless of the window length.

use crate::series::{PriceBar, PriceSeries};
use comfy_table::Table;
use comfy_table::presets::NOTHING;
use std::fmt;

/// Rows shown at each end of the series
pub const SAMPLE_ROWS: usize = 10;

/// Summary statistics of one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); NaN for a single observation
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Compute statistics over non-empty `values`
    fn from_values(column: &'static str, values: &[f64]) -> Self {
        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if count > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Self {
            column,
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }
}

/// Linear-interpolation quantile of sorted, non-empty data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Statistics for Open, High, Low, Close and Volume, in that order
pub fn describe(series: &PriceSeries) -> Vec<ColumnStats> {
    let columns: [(&'static str, fn(&PriceBar) -> f64); 5] = [
        ("Open", |b| b.open),
        ("High", |b| b.high),
        ("Low", |b| b.low),
        ("Close", |b| b.close),
        ("Volume", |b| b.volume as f64),
    ];

    columns
        .iter()
        .map(|&(name, field)| {
            let values: Vec<f64> = series.bars().iter().map(field).collect();
            ColumnStats::from_values(name, &values)
        })
        .collect()
}

/// Digest handed to the report generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesDigest {
    pub statistics: String,
    pub head: String,
    pub tail: String,
}

impl SeriesDigest {
    /// Build the digest of a series
    pub fn from_series(series: &PriceSeries) -> Self {
        let tail_offset = series.len().saturating_sub(SAMPLE_ROWS);
        Self {
            statistics: statistics_table(&describe(series)),
            head: rows_table(series.head(SAMPLE_ROWS), 0),
            tail: rows_table(series.tail(SAMPLE_ROWS), tail_offset),
        }
    }
}

impl fmt::Display for SeriesDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Statistics:\n{}\n\nFirst {SAMPLE_ROWS} rows:\n{}\n\nLast {SAMPLE_ROWS} rows:\n{}",
            self.statistics, self.head, self.tail
        )
    }
}

fn fmt_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn statistics_table(stats: &[ColumnStats]) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING);

    let mut header = vec![String::new()];
    header.extend(stats.iter().map(|s| s.column.to_string()));
    table.set_header(header);

    let rows: [(&str, fn(&ColumnStats) -> String); 8] = [
        ("count", |s| s.count.to_string()),
        ("mean", |s| fmt_stat(s.mean)),
        ("std", |s| fmt_stat(s.std)),
        ("min", |s| fmt_stat(s.min)),
        ("25%", |s| fmt_stat(s.q25)),
        ("50%", |s| fmt_stat(s.median)),
        ("75%", |s| fmt_stat(s.q75)),
        ("max", |s| fmt_stat(s.max)),
    ];
    for (label, cell) in rows {
        let mut row = vec![label.to_string()];
        row.extend(stats.iter().map(cell));
        table.add_row(row);
    }

    table.to_string()
}

/// Bars as a table whose first column is the row index in the full series
pub(crate) fn rows_table(bars: &[PriceBar], index_offset: usize) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING);

    let mut header = vec![String::new()];
    header.extend(PriceBar::COLUMNS.iter().map(|c| (*c).to_string()));
    table.set_header(header);

    for (i, bar) in bars.iter().enumerate() {
        table.add_row(vec![
            (index_offset + i).to_string(),
            bar.date.to_string(),
            format!("{:.2}", bar.open),
            format!("{:.2}", bar.high),
            format!("{:.2}", bar.low),
            format!("{:.2}", bar.close),
            bar.volume.to_string(),
        ]);
    }

    table.to_string()
}
