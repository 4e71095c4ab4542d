//! Yearly high/low news correlation and trend reports for a single stock
//!
//! A run fetches a year of daily prices, finds the bars with the highest high
//! and the lowest low, looks up the headlines published on those days, asks a
//! text-generation service for a sectioned plain-text report, exports the
//! series to CSV and charts the closing price.
//!
//! # Architecture
//!
//! Upstream services sit behind capability traits so the pipeline can be
//! driven with fakes:
//! - [`PriceProvider`]: daily history (Yahoo Finance)
//! - [`NewsProvider`]: headlines for one day (thenewsapi.com)
//! - [`trend_llm::TextGenerator`]: the report (any OpenAI-compatible API, Groq by default)
//! - [`ChartRenderer`]: the closing-price chart (SVG)
//!
//! # Example
//!
//! ```rust,no_run
//! use stock_trend::{StockConfig, TrendPipeline};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().with_env_keys().build()?;
//!     let pipeline = TrendPipeline::from_config(&config)?;
//!
//!     let mut stdout = std::io::stdout();
//!     pipeline.run("AAPL", &mut stdout).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chart;
pub mod companies;
pub mod config;
pub mod error;
pub mod export;
pub mod extrema;
pub mod fetcher;
pub mod news;
pub mod pipeline;
pub mod report;
pub mod series;

pub use api::{NewsProvider, PriceProvider};
pub use chart::{ChartRenderer, SvgChartRenderer};
pub use companies::company_name;
pub use config::StockConfig;
pub use error::{Result, StockError};
pub use export::CsvExporter;
pub use extrema::{locate_max_high, locate_min_low};
pub use fetcher::SeriesFetcher;
pub use news::{NewsCorrelator, NewsOptions, NewsResult, parse_news_date};
pub use pipeline::{AbortReason, RunOutcome, RunReport, Stage, StageOutcome, StageRecord, TrendPipeline};
pub use report::{AnalysisReport, ReportGenerator, SeriesDigest};
pub use series::{PriceBar, PriceSeries};
