//! Score fusion
//!
//! Unifies the tagged per-source rows into `HybridCandidate` through one
//! mapping function per source, then fuses scores null-safely: a dish
//! appearing in both branches gets the weighted sum, a dish appearing in
//! one branch keeps its raw score untouched. Absence of a signal is never
//! a penalty.

use std::collections::HashMap;
use uuid::Uuid;

use dishcovery_core::{
    CandidateSource, DishRow, HybridCandidate, SemanticRow, TagRow, TrigramRow,
};
use dishcovery_text::{fuzzy_token_match, normalize, significant_tokens};

use crate::weighting::WeightProfile;

/// Maximum exact-match boost, scaled by the fraction of significant query
/// tokens literally present in the dish name.
const EXACT_MATCH_BOOST: f32 = 0.15;

/// Score multiplier for specific-query candidates missing a significant
/// query token in their name. Demotion, not deletion: the candidate stays
/// available as a fallback.
const DEMOTION_FACTOR: f32 = 0.3;

fn from_row(row: DishRow, semantic: Option<f32>, trigram: Option<f32>) -> HybridCandidate {
    let (final_score, source) = match (semantic, trigram) {
        (Some(s), Some(t)) => (s.max(t), CandidateSource::Both),
        (Some(s), None) => (s, CandidateSource::Semantic),
        (None, Some(t)) => (t, CandidateSource::Trigram),
        (None, None) => (1.0, CandidateSource::Tag),
    };
    HybridCandidate {
        dish_id: row.dish_id,
        dish_name: row.dish_name,
        restaurant_id: row.restaurant_id,
        restaurant_name: row.restaurant_name,
        description: row.description,
        section_name: row.section_name,
        price_sek: row.price_sek,
        semantic_score: semantic,
        trigram_score: trigram,
        final_score,
        source,
    }
}

/// Map a semantic row into the shared candidate shape
pub fn candidate_from_semantic(row: SemanticRow) -> HybridCandidate {
    from_row(row.dish, Some(row.similarity), None)
}

/// Map a trigram row into the shared candidate shape
pub fn candidate_from_trigram(row: TrigramRow) -> HybridCandidate {
    from_row(row.dish, None, Some(row.similarity))
}

/// Map a tag row into the shared candidate shape
pub fn candidate_from_tag(row: TagRow) -> HybridCandidate {
    from_row(row.dish, None, None)
}

/// Fraction of significant (>= 3 char) query tokens literally present in
/// the dish name, as normalized tokens.
fn exact_match_fraction(query: &str, dish_name: &str) -> f32 {
    let query_tokens = significant_tokens(query);
    if query_tokens.is_empty() {
        return 0.0;
    }
    let name_tokens = normalize(dish_name);
    let matched = query_tokens
        .iter()
        .filter(|qt| name_tokens.iter().any(|nt| nt == *qt))
        .count();
    matched as f32 / query_tokens.len() as f32
}

/// Whether the dish name misses any significant query token (fuzzy match)
fn missing_query_token(query: &str, dish_name: &str) -> bool {
    let name_tokens = normalize(dish_name);
    significant_tokens(query)
        .iter()
        .any(|qt| !name_tokens.iter().any(|nt| fuzzy_token_match(qt, nt)))
}

/// Fuse semantic and trigram results for one query
///
/// Null-safe: both scores -> weighted sum; one score -> used directly.
/// Then the exact-match boost is added (capped so the total never exceeds
/// 1.0) and, for specific queries, the precision demotion re-sorts the
/// full set without removing anything.
pub fn fuse(
    query: &str,
    semantic: Vec<SemanticRow>,
    trigram: Vec<TrigramRow>,
    profile: WeightProfile,
) -> Vec<HybridCandidate> {
    let mut by_dish: HashMap<Uuid, HybridCandidate> = HashMap::new();

    for row in semantic {
        by_dish.insert(row.dish.dish_id, candidate_from_semantic(row));
    }
    for row in trigram {
        match by_dish.get_mut(&row.dish.dish_id) {
            Some(existing) => {
                existing.trigram_score = Some(row.similarity);
                existing.source = CandidateSource::Both;
            }
            None => {
                by_dish.insert(row.dish.dish_id, candidate_from_trigram(row));
            }
        }
    }

    let mut candidates: Vec<HybridCandidate> = by_dish
        .into_values()
        .map(|mut c| {
            let fused = match (c.semantic_score, c.trigram_score) {
                (Some(s), Some(t)) => profile.semantic * s + profile.trigram * t,
                (Some(s), None) => s,
                (None, Some(t)) => t,
                (None, None) => c.final_score,
            };
            let boost = EXACT_MATCH_BOOST * exact_match_fraction(query, &c.dish_name);
            c.final_score = (fused + boost).min(1.0);
            c
        })
        .collect();

    if profile.specific {
        for c in &mut candidates {
            if missing_query_token(query, &c.dish_name) {
                c.final_score *= DEMOTION_FACTOR;
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}
