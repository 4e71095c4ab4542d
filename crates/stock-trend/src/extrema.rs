//! Extremum location over a price series
//!
//! Both scans are single linear passes with strict comparisons, so on ties
//! the earliest bar wins.

use crate::error::{Result, StockError};
use crate::series::{PriceBar, PriceSeries};

/// Bar with the series-wide maximum `high`
pub fn locate_max_high(series: &PriceSeries) -> Result<&PriceBar> {
    max_high_in(series.bars())
}

/// Bar with the series-wide minimum `low`
pub fn locate_min_low(series: &PriceSeries) -> Result<&PriceBar> {
    min_low_in(series.bars())
}

/// Bar with the maximum `high` in a slice
pub fn max_high_in(bars: &[PriceBar]) -> Result<&PriceBar> {
    first_by(bars, |candidate, best| candidate.high > best.high)
        .ok_or(StockError::EmptyInput("cannot locate the highest price of an empty series"))
}

/// Bar with the minimum `low` in a slice
pub fn min_low_in(bars: &[PriceBar]) -> Result<&PriceBar> {
    first_by(bars, |candidate, best| candidate.low < best.low)
        .ok_or(StockError::EmptyInput("cannot locate the lowest price of an empty series"))
}

fn first_by<F>(bars: &[PriceBar], beats: F) -> Option<&PriceBar>
where
    F: Fn(&PriceBar, &PriceBar) -> bool,
{
    let (first, rest) = bars.split_first()?;
    Some(rest.iter().fold(first, |best, bar| if beats(bar, best) { bar } else { best }))
}
