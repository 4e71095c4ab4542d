//! Text-generation provider trait

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A service that turns a chat conversation into generated text
///
/// Implementations wrap a concrete API (Groq, OpenAI, a local server). The
/// pipeline only depends on this trait so tests can substitute a fake.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the request in a single round trip
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name used in logs and error messages (e.g. "groq")
    fn name(&self) -> &str;
}
