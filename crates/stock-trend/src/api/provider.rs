//! Capability traits for upstream data sources
//!
//! The pipeline only talks to these traits, so tests can swap in
//! deterministic fakes for the Yahoo and thenewsapi clients.

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A provider row before normalization
///
/// Every field is optional so a response missing data can be told apart
/// from a response with no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBar {
    /// Unix timestamp in seconds
    pub timestamp: Option<i64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
    /// Exchange offset from UTC in seconds; the trading day is read in it
    pub utc_offset: i32,
}

/// Source of daily price history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily bars for `symbol` from `start` (inclusive) to `end` (exclusive)
    async fn history(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>>;

    /// Provider name used in logs and errors
    fn name(&self) -> &'static str;
}

/// A single-day news search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsQuery {
    /// Exact publication day
    pub published_on: NaiveDate,
    /// Free-text category tags
    pub categories: Vec<String>,
    /// Free-text search string, usually the company name
    pub subject: String,
    pub language: String,
    pub max_results: u32,
}

/// An article as returned by a news provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Source of news articles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Articles matching the query, in provider order; empty when nothing matched
    async fn search(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>>;

    /// Provider name used in logs and errors
    fn name(&self) -> &'static str;
}
