//! Configuration for stock trend runs

use crate::error::{Result, StockError};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the news API token
pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";
/// Environment variable holding the text-generation API key
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";
/// Optional override of the news API base URL
pub const NEWS_API_BASE_VAR: &str = "NEWS_API_BASE";
/// Optional override of the text-generation API base URL
pub const GROQ_API_BASE_VAR: &str = "GROQ_API_BASE";
/// Optional override of the text-generation model
pub const GROQ_MODEL_VAR: &str = "GROQ_MODEL";

/// Configuration for a stock trend run
///
/// Credentials are plain strings handed to each client's constructor. An
/// empty key is accepted here; the upstream service rejects it at request time.
#[derive(Debug, Clone)]
pub struct StockConfig {
    /// Trailing window used when no start date is given
    pub lookback_days: u32,

    /// News API token (thenewsapi.com)
    pub news_api_key: String,

    /// Base URL of the news API
    pub news_api_base: String,

    /// Categories sent with every news query
    pub news_categories: Vec<String>,

    /// Language sent with every news query
    pub news_language: String,

    /// Maximum headlines requested per extremum
    pub news_max_results: u32,

    /// News requests allowed per minute
    pub news_rate_limit: u32,

    /// Text-generation API key
    pub llm_api_key: String,

    /// Base URL of the OpenAI-compatible text-generation API
    pub llm_api_base: String,

    /// Model used for the report
    pub model: String,

    /// Sampling temperature for the report
    pub temperature: f32,

    /// Optional cap on generated tokens
    pub max_tokens: Option<usize>,

    /// Timeout for the report round trip
    pub report_timeout: Duration,

    /// Timeout for news requests
    pub request_timeout: Duration,

    /// Directory receiving the CSV export and the chart
    pub output_dir: PathBuf,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            news_api_key: String::new(),
            news_api_base: "https://api.thenewsapi.com".to_string(),
            news_categories: vec!["business".to_string(), "tech".to_string()],
            news_language: "en".to_string(),
            news_max_results: 10,
            news_rate_limit: 60,
            llm_api_key: String::new(),
            llm_api_base: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
            temperature: 0.7,
            max_tokens: None,
            report_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("."),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.lookback_days == 0 {
            return Err(StockError::Config(
                "lookback_days must be greater than 0".to_string(),
            ));
        }

        if self.news_max_results == 0 {
            return Err(StockError::Config(
                "news_max_results must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(StockError::Config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }

        if self.report_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(StockError::Config(
                "timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    lookback_days: Option<u32>,
    news_api_key: Option<String>,
    news_api_base: Option<String>,
    news_categories: Option<Vec<String>>,
    news_language: Option<String>,
    news_max_results: Option<u32>,
    news_rate_limit: Option<u32>,
    llm_api_key: Option<String>,
    llm_api_base: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    report_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    output_dir: Option<PathBuf>,
}

impl StockConfigBuilder {
    /// Set the default trailing window in days
    pub fn lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = Some(days);
        self
    }

    /// Set the news API token
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Set the news API base URL
    pub fn news_api_base(mut self, base: impl Into<String>) -> Self {
        self.news_api_base = Some(base.into());
        self
    }

    /// Set the news categories
    pub fn news_categories(mut self, categories: Vec<String>) -> Self {
        self.news_categories = Some(categories);
        self
    }

    /// Set the news language
    pub fn news_language(mut self, language: impl Into<String>) -> Self {
        self.news_language = Some(language.into());
        self
    }

    /// Set the maximum number of headlines per query
    pub fn news_max_results(mut self, max: u32) -> Self {
        self.news_max_results = Some(max);
        self
    }

    /// Set the news requests allowed per minute
    pub fn news_rate_limit(mut self, per_minute: u32) -> Self {
        self.news_rate_limit = Some(per_minute);
        self
    }

    /// Set the text-generation API key
    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = Some(key.into());
        self
    }

    /// Set the text-generation API base URL
    pub fn llm_api_base(mut self, base: impl Into<String>) -> Self {
        self.llm_api_base = Some(base.into());
        self
    }

    /// Set the report model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the report temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the generated tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the report timeout
    pub fn report_timeout(mut self, duration: Duration) -> Self {
        self.report_timeout = Some(duration);
        self
    }

    /// Set the news request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the output directory for the CSV export and the chart
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Load API keys and endpoint overrides from the environment
    ///
    /// Reads `NEWS_API_KEY` and `GROQ_API_KEY`, plus the optional
    /// `NEWS_API_BASE`, `GROQ_API_BASE` and `GROQ_MODEL`. Missing keys stay
    /// empty; unset or blank overrides leave the current value alone.
    pub fn with_env_keys(mut self) -> Self {
        self.news_api_key = Some(trend_utils::var_or_empty(NEWS_API_KEY_VAR));
        self.llm_api_key = Some(trend_utils::var_or_empty(GROQ_API_KEY_VAR));

        self.news_api_base = trend_utils::var_opt(NEWS_API_BASE_VAR).or(self.news_api_base);
        self.llm_api_base = trend_utils::var_opt(GROQ_API_BASE_VAR).or(self.llm_api_base);
        self.model = trend_utils::var_opt(GROQ_MODEL_VAR).or(self.model);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            lookback_days: self.lookback_days.unwrap_or(defaults.lookback_days),
            news_api_key: self.news_api_key.unwrap_or(defaults.news_api_key),
            news_api_base: self.news_api_base.unwrap_or(defaults.news_api_base),
            news_categories: self.news_categories.unwrap_or(defaults.news_categories),
            news_language: self.news_language.unwrap_or(defaults.news_language),
            news_max_results: self.news_max_results.unwrap_or(defaults.news_max_results),
            news_rate_limit: self.news_rate_limit.unwrap_or(defaults.news_rate_limit),
            llm_api_key: self.llm_api_key.unwrap_or(defaults.llm_api_key),
            llm_api_base: self.llm_api_base.unwrap_or(defaults.llm_api_base),
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            report_timeout: self.report_timeout.unwrap_or(defaults.report_timeout),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        };

        config.validate()?;
        Ok(config)
    }
}
