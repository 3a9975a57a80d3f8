//! LLM prompt construction and resilient service wrappers
//!
//! Features:
//! - Fixed instruction prompts with few-shot examples for intent
//!   extraction and action classification
//! - Lenient serde schemas for the completion drafts (unknown fields
//!   ignored, every field optional)
//! - Retrying embedding wrapper with bounded exponential backoff

pub mod prompt;
pub mod retry;
pub mod schema;

pub use prompt::PromptBuilder;
pub use retry::{RetryConfig, RetryingEmbedder};
pub use schema::{ActionDraft, IntentDraft};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Embedding error: {0}")]
    Embedding(String),
}

impl From<LlmError> for dishcovery_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Embedding(msg) => dishcovery_core::Error::Embedding(msg),
            other => dishcovery_core::Error::Llm(other.to_string()),
        }
    }
}
