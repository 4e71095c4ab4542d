//! News correlation for a single day

use crate::api::{NewsProvider, NewsQuery};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Date layouts accepted by [`parse_news_date`], tried in order
///
/// Day-first wins over month-first for ambiguous input such as `01/02/2024`.
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%B %d, %Y"];

/// Headlines found for a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsResult {
    /// Titles in provider order
    Headlines(Vec<String>),
    /// Nothing matched
    Empty,
}

impl NewsResult {
    /// Wrap headlines, using `Empty` for an empty list
    pub fn from_headlines(headlines: Vec<String>) -> Self {
        if headlines.is_empty() {
            Self::Empty
        } else {
            Self::Headlines(headlines)
        }
    }

    /// Headlines, empty slice when nothing matched
    pub fn headlines(&self) -> &[String] {
        match self {
            Self::Headlines(h) => h,
            Self::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for NewsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Headlines(headlines) => {
                for (i, title) in headlines.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{title}")?;
                }
                Ok(())
            }
            Self::Empty => write!(f, "No news found for this date."),
        }
    }
}

/// Per-query knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsOptions {
    pub categories: Vec<String>,
    pub language: String,
    pub max_results: u32,
}

impl Default for NewsOptions {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            language: "en".to_string(),
            max_results: 10,
        }
    }
}

impl NewsOptions {
    /// Options taken from the run configuration
    pub fn from_config(config: &StockConfig) -> Self {
        Self {
            categories: config.news_categories.clone(),
            language: config.news_language.clone(),
            max_results: config.news_max_results,
        }
    }
}

/// Parse date text in any of the [`DATE_FORMATS`]
pub fn parse_news_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| StockError::DateParse(text.to_string()))
}

/// Maps a date and subject to contemporaneous headlines
#[derive(Clone)]
pub struct NewsCorrelator {
    provider: Arc<dyn NewsProvider>,
    defaults: NewsOptions,
}

impl NewsCorrelator {
    /// Create a correlator; `defaults` apply to [`correlate`](Self::correlate)
    pub fn new(provider: Arc<dyn NewsProvider>, defaults: NewsOptions) -> Self {
        Self { provider, defaults }
    }

    /// Headlines for `date_text` about `subject`, with the default options
    pub async fn correlate(&self, date_text: &str, subject: &str) -> Result<NewsResult> {
        self.correlate_with(date_text, subject, &self.defaults).await
    }

    /// Headlines for `date_text` about `subject`
    ///
    /// Unparsable dates fail before any request is made.
    pub async fn correlate_with(
        &self,
        date_text: &str,
        subject: &str,
        options: &NewsOptions,
    ) -> Result<NewsResult> {
        let date = parse_news_date(date_text)?;
        self.correlate_on(date, subject, options).await
    }

    /// Headlines for a canonical date; a single request, no retry
    #[instrument(skip(self, options))]
    pub async fn correlate_on(
        &self,
        date: NaiveDate,
        subject: &str,
        options: &NewsOptions,
    ) -> Result<NewsResult> {
        let query = NewsQuery {
            published_on: date,
            categories: options.categories.clone(),
            subject: subject.to_string(),
            language: options.language.clone(),
            max_results: options.max_results,
        };

        let articles = self.provider.search(&query).await?;
        debug!(
            provider = self.provider.name(),
            articles = articles.len(),
            "News query finished"
        );

        Ok(NewsResult::from_headlines(
            articles
                .into_iter()
                .map(|a| a.title.unwrap_or_else(|| "-".to_string()))
                .collect(),
        ))
    }
}
