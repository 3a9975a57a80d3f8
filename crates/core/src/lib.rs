//! Core traits and types for the dishcovery search pipeline
//!
//! This crate provides foundational types used across all other crates:
//! - Intent and Plan types for query understanding
//! - Session state (`ChatState`, `GroundedState`) passed through each turn
//! - Retrieval row/candidate/card types
//! - Trait contracts for the external collaborators (embedding service,
//!   structured completion service, dish store, translator)
//! - Error types

pub mod error;
pub mod intent;
pub mod language;
pub mod plan;
pub mod retrieval;
pub mod state;
pub mod traits;

pub use error::{Error, Result};
pub use intent::{HardTag, Intent};
pub use language::Language;
pub use plan::{Action, Plan, PrefsPatch, SearchParams};
pub use retrieval::{
    CandidateSource, DishMatch, DishRow, HybridCandidate, RestaurantCandidate, RestaurantCard,
    SearchFilters, SemanticRow, TagRow, TrigramRow, Truncation,
};
pub use state::{ChatMode, ChatState, GroundedState, LastResultDish, Turn, TurnRole};
pub use traits::{CompletionProvider, DishStore, EmbeddingProvider, Translator};
