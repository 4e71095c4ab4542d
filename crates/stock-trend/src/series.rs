//! Canonical daily price series

use crate::error::{Result, StockError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day's observation
///
/// Field order and serialized names match the CSV export header
/// `Date,Open,High,Low,Close,Volume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
}

impl PriceBar {
    /// Column names in export order
    pub const COLUMNS: [&'static str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];
}

/// Ordered, non-empty sequence of daily bars with strictly increasing dates
///
/// Trading-calendar gaps are allowed. There is no mutating API: once built,
/// the series is only lent out by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, checking it is non-empty and strictly date-ordered
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self> {
        let symbol = symbol.into();

        if bars.is_empty() {
            return Err(StockError::EmptyInput("price series needs at least one bar"));
        }

        if let Some(pair) = bars.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(StockError::Schema {
                symbol,
                reason: format!(
                    "dates must be strictly increasing ({} then {})",
                    pair[0].date, pair[1].date
                ),
            });
        }

        Ok(Self { symbol, bars })
    }

    /// Ticker symbol the series belongs to
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All bars in ascending date order
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Number of bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Earliest bar
    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    /// Latest bar
    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    /// First `n` bars (fewer if the series is shorter)
    pub fn head(&self, n: usize) -> &[PriceBar] {
        &self.bars[..n.min(self.bars.len())]
    }

    /// Last `n` bars (fewer if the series is shorter)
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }
}

/// Round to 2 decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
