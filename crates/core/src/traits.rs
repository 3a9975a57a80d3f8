//! Trait contracts for the external collaborators
//!
//! The pipeline core never talks to a database, embedding model or LLM
//! directly; everything goes through these traits so the turn engine can be
//! tested with in-memory stubs and wired to real services by the
//! surrounding application.

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::Result;
use crate::language::Language;
use crate::retrieval::{RestaurantCandidate, SearchFilters, SemanticRow, TagRow, TrigramRow};

/// Embedding generation service (fixed dimensionality)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Structured LLM completion service
///
/// Returns parsed JSON or an error; refusals and schema violations are
/// surfaced as errors and treated identically to service failure.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<serde_json::Value>;
}

/// Query/RPC-shaped access to the restaurant and menu store
#[async_trait]
pub trait DishStore: Send + Sync {
    /// Vector similarity search over dish embeddings
    async fn semantic_search(
        &self,
        embedding: &[f32],
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<SemanticRow>>;

    /// Trigram/fuzzy text search over dish names and descriptions
    async fn fuzzy_search(
        &self,
        text: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<TrigramRow>>;

    /// Tag-filtered search with no query text
    async fn tag_search(
        &self,
        tag_slugs: &[String],
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<TagRow>>;

    /// Restaurant lookup by name: exact ILIKE first, trigram fallback
    async fn lookup_restaurant_by_name(&self, text: &str) -> Result<Vec<RestaurantCandidate>>;

    /// Tag slugs for a set of dishes, keyed by dish id
    async fn fetch_tags(&self, dish_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>>;
}

/// Best-effort translation service
///
/// Callers are expected to fall back to the original text when this
/// errors; no retrieval path depends on the translation succeeding.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language) -> Result<String>;
}
