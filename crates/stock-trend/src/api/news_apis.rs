//! News API client (thenewsapi.com)

use crate::api::provider::{NewsArticle, NewsProvider, NewsQuery};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const PROVIDER: &str = "thenewsapi";

/// Envelope of `GET /v1/news/all`
#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    data: Option<Vec<NewsArticle>>,
}

/// thenewsapi.com client
pub struct TheNewsApiClient {
    client: Client,
    api_token: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl TheNewsApiClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_token` - thenewsapi token; an empty token is rejected by the service
    /// * `base_url` - API root, e.g. `https://api.thenewsapi.com`
    /// * `rate_limit` - Requests per minute
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StockError::Config(format!("Failed to build news HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_token: api_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Query parameters for a search; empty optional values are left out
    fn query_params(&self, query: &NewsQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api_token", self.api_token.clone()),
            ("language", query.language.clone()),
            ("published_on", query.published_on.format("%Y-%m-%d").to_string()),
            ("limit", query.max_results.to_string()),
        ];

        if !query.categories.is_empty() {
            params.push(("categories", query.categories.join(",")));
        }
        if !query.subject.trim().is_empty() {
            params.push(("search", query.subject.clone()));
        }

        params
    }
}

#[async_trait]
impl NewsProvider for TheNewsApiClient {
    #[instrument(skip(self), fields(published_on = %query.published_on, subject = %query.subject))]
    async fn search(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v1/news/all", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| StockError::upstream(PROVIDER, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::upstream(PROVIDER, format!("HTTP {status}: {body}")));
        }

        let envelope: NewsEnvelope = response
            .json()
            .await
            .map_err(|e| StockError::malformed(PROVIDER, format!("unparsable body: {e}")))?;

        let articles = envelope
            .data
            .ok_or_else(|| StockError::malformed(PROVIDER, "response has no 'data' field"))?;

        debug!(articles = articles.len(), "Received news");
        Ok(articles)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
