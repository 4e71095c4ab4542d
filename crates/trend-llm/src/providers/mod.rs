//! Concrete text-generation providers

pub mod openai;

pub use openai::{OpenAIConfig, OpenAIProvider};
