//! Error types shared across the pipeline crates
//!
//! Every stage of the pipeline degrades rather than propagating: the
//! variants here exist so call sites can log a stable reason code before
//! falling back, not so errors can escape a turn.

use thiserror::Error;

/// Top-level error for the dishcovery core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Intent extraction error: {0}")]
    Intent(String),

    #[error("Planning error: {0}")]
    Planning(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// Result alias using the core error
pub type Result<T> = std::result::Result<T, Error>;
