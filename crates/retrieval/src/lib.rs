//! Hybrid dish retrieval with score fusion
//!
//! Features:
//! - Tag-only dispatch and text dispatch from one entry point
//! - Parallel semantic (vector) and lexical (trigram) branches joined
//!   before fusion; either branch may fail or come back empty without
//!   aborting the other
//! - Query-profile weighting (vibe / short-or-dish-name / balanced)
//! - Null-safe weighted fusion with an exact-match boost and precision
//!   demotion for specific queries
//! - Explicit ordered legacy fallback strategies with a finite trace
//! - Post-retrieval token precision filter
//! - Bounded LRU translation cache injected into the lexical branch
//! - Result finalizer: focus isolation, match filtering, bounding and
//!   truncation metadata

pub mod cache;
pub mod engine;
pub mod finalize;
pub mod fusion;
pub mod strategy;
pub mod token_filter;
pub mod weighting;

pub use cache::TranslationCache;
pub use engine::{EngineConfig, HybridSearchEngine, RetrievalOutcome};
pub use finalize::{finalize_results, MatchCriteria, ShapedResults, ShaperConfig};
pub use fusion::{candidate_from_semantic, candidate_from_tag, candidate_from_trigram, fuse};
pub use token_filter::apply_token_filter;
pub use weighting::{classify_query, WeightProfile};

use thiserror::Error;

/// Retrieval errors
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<RetrievalError> for dishcovery_core::Error {
    fn from(err: RetrievalError) -> Self {
        dishcovery_core::Error::Retrieval(err.to_string())
    }
}
