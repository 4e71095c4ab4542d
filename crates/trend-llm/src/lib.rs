//! Text-generation abstraction for stock-trend
//!
//! This crate provides provider-agnostic types for asking a chat-completion
//! model for text:
//!
//! - Message types for chat conversations
//! - Completion request/response types
//! - The [`TextGenerator`] trait implemented by concrete providers
//! - An OpenAI-compatible provider (behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::TextGenerator;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
