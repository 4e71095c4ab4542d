//! Time-series fetching and normalization

use crate::api::{PriceProvider, RawBar};
use crate::error::{Result, StockError};
use crate::series::{PriceBar, PriceSeries, round2};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fetches a symbol's daily history and turns it into a canonical [`PriceSeries`]
#[derive(Clone)]
pub struct SeriesFetcher {
    provider: Arc<dyn PriceProvider>,
    lookback_days: u32,
}

impl SeriesFetcher {
    /// Create a fetcher with the default trailing window
    pub fn new(provider: Arc<dyn PriceProvider>, lookback_days: u32) -> Self {
        Self {
            provider,
            lookback_days,
        }
    }

    /// Fetch `symbol` between `start` and `end`
    ///
    /// Missing bounds default to the trailing `lookback_days` ending today.
    pub async fn fetch(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries> {
        self.fetch_as_of(symbol, start, end, Utc::now().date_naive())
            .await
    }

    /// Same as [`fetch`](Self::fetch) with an explicit "today"
    #[instrument(skip(self))]
    pub async fn fetch_as_of(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<PriceSeries> {
        let symbol = validate_symbol(symbol)?;
        let (start, end) = resolve_window(start, end, today, self.lookback_days)?;

        debug!(%start, %end, provider = self.provider.name(), "Fetching price history");
        let rows = self.provider.history(symbol, start, end).await?;

        if rows.is_empty() {
            return Err(StockError::EmptySeries {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }

        let bars = normalize(symbol, rows)?;
        let series = PriceSeries::new(symbol, bars)?;

        info!(bars = series.len(), "Fetched price series");
        Ok(series)
    }
}

/// Trim and check a ticker symbol
fn validate_symbol(symbol: &str) -> Result<&str> {
    let symbol = symbol.trim();

    if symbol.is_empty() {
        return Err(StockError::Validation(
            "ticker symbol must not be empty".to_string(),
        ));
    }

    if symbol.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(StockError::Validation(format!(
            "ticker symbol '{symbol}' must not contain whitespace"
        )));
    }

    Ok(symbol)
}

/// Fill in missing bounds; the default window ends today
pub fn resolve_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    lookback_days: u32,
) -> Result<(NaiveDate, NaiveDate)> {
    let end = end.unwrap_or(today);
    let start = match start {
        Some(start) => start,
        None => end
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .ok_or_else(|| StockError::Validation(format!("lookback before {end} is out of range")))?,
    };

    if start > end {
        return Err(StockError::Validation(format!(
            "start date {start} is after end date {end}"
        )));
    }

    Ok((start, end))
}

/// Check fields, convert timestamps to exchange-local dates, round prices,
/// sort and collapse duplicate dates (last row wins)
fn normalize(symbol: &str, rows: Vec<RawBar>) -> Result<Vec<PriceBar>> {
    let schema = |index: usize, reason: &str| StockError::Schema {
        symbol: symbol.to_string(),
        reason: format!("row {index}: {reason}"),
    };

    let mut bars = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let timestamp = row.timestamp.ok_or_else(|| schema(index, "missing date"))?;
        let offset = FixedOffset::east_opt(row.utc_offset)
            .ok_or_else(|| schema(index, "exchange offset out of range"))?;
        let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
            .ok_or_else(|| schema(index, "timestamp out of range"))?
            .with_timezone(&offset)
            .date_naive();

        let price = |value: Option<f64>, field: &str| -> Result<f64> {
            match value {
                Some(v) if v.is_finite() => Ok(round2(v)),
                Some(_) => Err(schema(index, &format!("non-finite {field}"))),
                None => Err(schema(index, &format!("missing {field}"))),
            }
        };

        bars.push(PriceBar {
            date,
            open: price(row.open, "Open")?,
            high: price(row.high, "High")?,
            low: price(row.low, "Low")?,
            close: price(row.close, "Close")?,
            volume: row.volume.unwrap_or(0),
        });
    }

    // Stable sort keeps provider order within a date, so the last one is the latest revision.
    bars.sort_by_key(|bar| bar.date);
    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(prev) if prev.date == bar.date => *prev = bar,
            _ => deduped.push(bar),
        }
    }

    Ok(deduped)
}
