//! Upstream providers for prices and news

pub mod news_apis;
pub mod provider;
pub mod yahoo;

pub use news_apis::TheNewsApiClient;
pub use provider::{NewsArticle, NewsProvider, NewsQuery, PriceProvider, RawBar};
pub use yahoo::YahooFinanceClient;
