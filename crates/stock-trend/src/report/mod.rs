//! Narrative trend report
//!
//! A [`SeriesDigest`] of the series is sent with a fixed prompt to a
//! [`TextGenerator`]; the trimmed answer becomes the [`AnalysisReport`].

pub mod digest;
mod prompts;

pub use digest::{ColumnStats, SAMPLE_ROWS, SeriesDigest, describe};
pub use prompts::{REPORT_SECTIONS, SYSTEM_PROMPT, render_analysis_prompt};

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use trend_llm::providers::{OpenAIConfig, OpenAIProvider};
use trend_llm::{CompletionRequest, Message, TextGenerator};
use tracing::{debug, info, instrument};

/// Plain-text report returned by the text generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport(String);

impl AnalysisReport {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Asks a text generator for the trend report
#[derive(Clone)]
pub struct ReportGenerator {
    generator: Arc<dyn TextGenerator>,
    model: String,
    temperature: f32,
    max_tokens: Option<usize>,
    timeout: Duration,
}

impl ReportGenerator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: Option<usize>,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            model: model.into(),
            temperature,
            max_tokens,
            timeout,
        }
    }

    /// Use the model settings from `config` with an injected generator
    pub fn with_generator(generator: Arc<dyn TextGenerator>, config: &StockConfig) -> Self {
        Self::new(
            generator,
            config.model.clone(),
            config.temperature,
            config.max_tokens,
            config.report_timeout,
        )
    }

    /// Build a generator backed by the OpenAI-compatible endpoint in `config`
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        let provider_config = OpenAIConfig::new(config.llm_api_key.clone())
            .with_api_base(config.llm_api_base.trim_end_matches('/'))
            .with_timeout(config.report_timeout.as_secs().max(1));
        let provider = OpenAIProvider::with_config(provider_config)
            .map_err(|e| StockError::Config(format!("Failed to build text generator: {e}")))?;

        Ok(Self::with_generator(Arc::new(provider), config))
    }

    /// The request [`generate`](Self::generate) sends
    pub fn build_request(&self, digest: &SeriesDigest, subject_name: &str) -> Result<CompletionRequest> {
        let prompt = render_analysis_prompt(subject_name, &digest.to_string())?;

        Ok(CompletionRequest::builder(self.model.clone())
            .system(SYSTEM_PROMPT)
            .add_message(Message::user(prompt))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build())
    }

    /// Generate the report for `subject_name`; one round trip, no retry
    #[instrument(skip(self, digest), fields(model = %self.model))]
    pub async fn generate(&self, digest: &SeriesDigest, subject_name: &str) -> Result<AnalysisReport> {
        let request = self.build_request(digest, subject_name)?;
        let provider = self.generator.name().to_string();

        debug!(provider = %provider, "Requesting analysis report");
        let response = tokio::time::timeout(self.timeout, self.generator.complete(request))
            .await
            .map_err(|_| {
                StockError::upstream(
                    provider.clone(),
                    format!("no response within {:?}", self.timeout),
                )
            })??;

        let tokens = response.usage.map(|usage| usage.total());
        let text = response
            .message
            .text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| StockError::malformed(provider, "response has no content"))?;

        info!(chars = text.len(), tokens, "Analysis report received");
        Ok(AnalysisReport(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::fixtures::series_with_highs;
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Mutex;
    use trend_llm::{CompletionResponse, LLMError, Role, StopReason, TokenUsage};

    /// Generator answering with a canned result and recording requests
    struct FakeGenerator {
        reply: fn() -> trend_llm::Result<CompletionResponse>,
        delay: Duration,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeGenerator {
        fn new(reply: fn() -> trend_llm::Result<CompletionResponse>) -> Self {
            Self {
                reply,
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn complete(&self, request: CompletionRequest) -> trend_llm::Result<CompletionResponse> {
            self.seen.lock().unwrap().push(request);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            (self.reply)()
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn reply_with(content: Option<&str>) -> trend_llm::Result<CompletionResponse> {
        Ok(CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: content.map(String::from),
            },
            stop_reason: StopReason::EndTurn,
            usage: None,
        })
    }

    fn digest() -> SeriesDigest {
        SeriesDigest::from_series(&series_with_highs(&[10.0, 12.0, 15.0, 11.0, 9.0]))
    }

    fn generator_for(fake: Arc<FakeGenerator>) -> ReportGenerator {
        ReportGenerator::with_generator(fake, &StockConfig::default())
    }

    #[tokio::test]
    async fn test_generate_trims_report_and_sends_prompt() {
        let fake = Arc::new(FakeGenerator::new(|| {
            reply_with(Some("\n  Stock Performance Analysis\nSteady climb.\n\nSummary\nUp.  \n"))
        }));
        let reporter = generator_for(Arc::clone(&fake));

        let report = reporter.generate(&digest(), "Apple Inc.").await.unwrap();
        assert_eq!(report.as_str(), "Stock Performance Analysis\nSteady climb.\n\nSummary\nUp.");

        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let request = &seen[0];
        assert_eq!(request.model, "llama3-70b-8192");
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, None);
        assert_eq!(request.system.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);

        let prompt = request.messages[0].text().unwrap();
        assert!(prompt.contains("the company Apple Inc."));
        assert!(prompt.contains("Statistics:"));
        assert!(prompt.contains("First 10 rows:"));
    }

    #[tokio::test]
    async fn test_empty_content_is_malformed() {
        let replies: [fn() -> trend_llm::Result<CompletionResponse>; 2] =
            [|| reply_with(None), || reply_with(Some("   \n"))];
        for reply in replies {
            let reporter = generator_for(Arc::new(FakeGenerator::new(reply)));
            let err = reporter.generate(&digest(), "Apple Inc.").await.unwrap_err();
            assert_eq!(err.kind(), "MalformedResponseFailure");
        }
    }

    #[tokio::test]
    async fn test_generate_with_token_usage() {
        let reporter = generator_for(Arc::new(FakeGenerator::new(|| {
            let mut response = reply_with(Some("Summary\nFlat."))?;
            response.usage = Some(TokenUsage {
                input_tokens: 812,
                output_tokens: 304,
            });
            Ok(response)
        })));
        let report = reporter.generate(&digest(), "Apple Inc.").await.unwrap();
        assert_eq!(report.as_str(), "Summary\nFlat.");
    }

    #[tokio::test]
    async fn test_generator_errors_are_classified() {
        let reporter = generator_for(Arc::new(FakeGenerator::new(|| {
            Err(LLMError::AuthenticationFailed("HTTP 401 Unauthorized".to_string()))
        })));
        let err = reporter.generate(&digest(), "Apple Inc.").await.unwrap_err();
        assert_eq!(err.kind(), "UpstreamFailure");

        let reporter = generator_for(Arc::new(FakeGenerator::new(|| {
            Err(LLMError::UnexpectedResponse("No choices in response".to_string()))
        })));
        let err = reporter.generate(&digest(), "Apple Inc.").await.unwrap_err();
        assert_eq!(err.kind(), "MalformedResponseFailure");
    }

    #[tokio::test]
    async fn test_slow_generator_times_out() {
        let mut fake = FakeGenerator::new(|| reply_with(Some("late")));
        fake.delay = Duration::from_secs(30);

        let reporter = ReportGenerator::new(
            Arc::new(fake),
            "llama3-70b-8192",
            0.7,
            None,
            Duration::from_millis(50),
        );
        let err = reporter.generate(&digest(), "Apple Inc.").await.unwrap_err();
        assert!(matches!(err, StockError::Upstream { ref detail, .. } if detail.contains("50ms")));
    }

    #[tokio::test]
    async fn test_report_over_http() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("Authorization", "Bearer gsk-test");
                then.status(200).json_body(json!({
                    "choices": [{
                        "message": { "role": "assistant", "content": "Summary\nAll good." },
                        "finish_reason": "stop"
                    }]
                }));
            })
            .await;

        let config = StockConfig::builder()
            .llm_api_key("gsk-test")
            .llm_api_base(server.base_url())
            .build()
            .unwrap();
        let reporter = ReportGenerator::from_config(&config).unwrap();

        let report = reporter.generate(&digest(), "Apple Inc.").await.unwrap();
        mock.assert_async().await;
        assert_eq!(report.to_string(), "Summary\nAll good.");
    }

    #[tokio::test]
    async fn test_report_http_error_is_upstream() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body(r#"{"error":{"message":"Invalid API Key"}}"#);
            })
            .await;

        let config = StockConfig::builder()
            .llm_api_base(server.base_url())
            .build()
            .unwrap();
        let err = ReportGenerator::from_config(&config)
            .unwrap()
            .generate(&digest(), "Apple Inc.")
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::Upstream { ref detail, .. } if detail.contains("401")));
    }
}
