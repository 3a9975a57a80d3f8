//! Retrieval row, candidate and response-card types
//!
//! Each retrieval source returns its own tagged row type; the retrieval
//! crate unifies them through one mapping function into `HybridCandidate`.
//! Cards are derived per response and never persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Filters shared by every retrieval endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Tag slugs that must all be present on returned dishes
    pub tag_slugs: Vec<String>,
    pub city: Option<String>,
    pub budget_max_sek: Option<u32>,
}

/// Fields common to every retrieval row shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishRow {
    pub dish_id: Uuid,
    pub dish_name: String,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
    pub description: Option<String>,
    pub section_name: Option<String>,
    pub price_sek: Option<u32>,
}

/// One row from vector similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticRow {
    #[serde(flatten)]
    pub dish: DishRow,
    /// Cosine similarity in 0..=1
    pub similarity: f32,
}

/// One row from trigram/fuzzy text search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrigramRow {
    #[serde(flatten)]
    pub dish: DishRow,
    /// Trigram similarity in 0..=1
    pub similarity: f32,
}

/// One row from tag-filtered search (no text score)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRow {
    #[serde(flatten)]
    pub dish: DishRow,
}

/// Which retrieval branches produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    Semantic,
    Trigram,
    Both,
    /// Tag-only search; no text score exists
    Tag,
}

/// One fused retrieval result, discarded after shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridCandidate {
    pub dish_id: Uuid,
    pub dish_name: String,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
    pub description: Option<String>,
    pub section_name: Option<String>,
    pub price_sek: Option<u32>,
    /// Score from the semantic branch, None when it did not return the dish
    pub semantic_score: Option<f32>,
    /// Score from the trigram branch, None when it did not return the dish
    pub trigram_score: Option<f32>,
    pub final_score: f32,
    pub source: CandidateSource,
}

impl HybridCandidate {
    /// Searchable text for token-precision checks: name, description and
    /// section name joined.
    pub fn haystack(&self) -> String {
        let mut text = self.dish_name.clone();
        if let Some(ref desc) = self.description {
            text.push(' ');
            text.push_str(desc);
        }
        if let Some(ref section) = self.section_name {
            text.push(' ');
            text.push_str(section);
        }
        text
    }
}

/// A restaurant candidate from name lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCandidate {
    pub restaurant_id: Uuid,
    pub name: String,
    /// Name similarity in 0..=1 (1.0 for exact ILIKE hits)
    pub similarity: f32,
}

/// One matched dish inside a restaurant card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishMatch {
    pub dish_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub section_name: Option<String>,
    pub price_sek: Option<u32>,
    pub tag_slugs: Vec<String>,
    pub score: f32,
}

/// Response-shaped aggregate: one restaurant with its top matched dishes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCard {
    pub restaurant_id: Uuid,
    pub name: String,
    pub dishes: Vec<DishMatch>,
    /// Dishes shown on this card
    pub shown: usize,
    /// Dishes matched for this restaurant before bounding
    pub total: usize,
    /// Offset to request for "load more", None when exhausted
    pub next_offset: Option<usize>,
}

/// Truncation metadata for the whole result set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Truncation {
    pub total_found: usize,
    pub total_returned: usize,
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> HybridCandidate {
        HybridCandidate {
            dish_id: Uuid::new_v4(),
            dish_name: "Palak Paneer".to_string(),
            restaurant_id: Uuid::new_v4(),
            restaurant_name: "Indian Bites".to_string(),
            description: Some("Spinach with cottage cheese".to_string()),
            section_name: Some("Mains".to_string()),
            price_sek: Some(149),
            semantic_score: Some(0.8),
            trigram_score: None,
            final_score: 0.8,
            source: CandidateSource::Semantic,
        }
    }

    #[test]
    fn test_haystack_includes_all_text_fields() {
        let haystack = candidate().haystack();
        assert!(haystack.contains("Palak Paneer"));
        assert!(haystack.contains("cottage cheese"));
        assert!(haystack.contains("Mains"));
    }
}
