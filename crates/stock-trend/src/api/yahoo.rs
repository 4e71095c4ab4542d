//! Yahoo Finance price history client

use crate::api::provider::{PriceProvider, RawBar};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

const PROVIDER: &str = "yahoo";

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }
}

/// Midnight UTC of `date` as a `time` timestamp
fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
    let secs = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(secs)
        .map_err(|e| StockError::Validation(format!("Invalid date {date}: {e}")))
}

/// Yahoo's ways of saying "no rows for this symbol and window"
fn is_empty_history(err: &yahoo::YahooError) -> bool {
    match err {
        yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes => true,
        // Unknown tickers come back as a chart error rather than an empty result.
        yahoo::YahooError::ApiError(message) => message.code.as_deref() == Some("Not Found"),
        _ => false,
    }
}

/// Failed history request: empty data sets are no rows, anything else is upstream
fn request_outcome(err: yahoo::YahooError) -> Result<Vec<RawBar>> {
    if is_empty_history(&err) {
        Ok(Vec::new())
    } else {
        Err(StockError::upstream(PROVIDER, err.to_string()))
    }
}

/// Unreadable quote block: empty data sets are no rows, anything else is a schema failure
fn quotes_outcome(symbol: &str, err: yahoo::YahooError) -> Result<Vec<RawBar>> {
    if is_empty_history(&err) {
        Ok(Vec::new())
    } else {
        Err(StockError::Schema {
            symbol: symbol.to_string(),
            reason: err.to_string(),
        })
    }
}

fn to_raw_bars(quotes: &[yahoo::Quote], utc_offset: i32) -> Vec<RawBar> {
    quotes
        .iter()
        .map(|q| RawBar {
            timestamp: Some(q.timestamp),
            open: Some(q.open),
            high: Some(q.high),
            low: Some(q.low),
            close: Some(q.close),
            volume: Some(q.volume),
            utc_offset,
        })
        .collect()
}

#[async_trait]
impl PriceProvider for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn history(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::upstream(PROVIDER, e.to_string()))?;

        let start_odt = to_offset_datetime(start)?;
        let end_odt = to_offset_datetime(end)?;

        let response = match provider.get_quote_history(symbol, start_odt, end_odt).await {
            Ok(response) => response,
            Err(e) => return request_outcome(e),
        };

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => return quotes_outcome(symbol, e),
        };
        let utc_offset = match response.metadata() {
            Ok(meta) => meta.gmtoffset,
            Err(e) => return quotes_outcome(symbol, e),
        };

        debug!(rows = quotes.len(), utc_offset, "Received Yahoo quote history");
        Ok(to_raw_bars(&quotes, utc_offset))
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
