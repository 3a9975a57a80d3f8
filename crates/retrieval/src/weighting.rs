//! Query weighting profiles
//!
//! The query text decides how much each retrieval branch is trusted:
//! mood/recommendation ("vibe") queries lean on semantic similarity,
//! short or dish-name queries lean on trigram matching for typo
//! tolerance, everything else gets a balanced split.

use once_cell::sync::Lazy;
use regex::Regex;

use dishcovery_text::{mentions_dish_name, normalize};

static VIBE_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(cozy|romantic|fancy|comfort|chill|mood|vibe|vibes|recommend|recommendation|suggest|suggestion|best|tasty|delicious|amazing|special|date|celebrat\w*|craving|something)\b",
    )
    .expect("vibe pattern must compile")
});

/// Branch weights plus the specificity judgement for demotion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightProfile {
    pub semantic: f32,
    pub trigram: f32,
    /// 2-4 word query with no vibe indicators: precision demotion applies
    pub specific: bool,
}

impl WeightProfile {
    pub const VIBE: WeightProfile = WeightProfile {
        semantic: 0.7,
        trigram: 0.3,
        specific: false,
    };
    pub const TYPO_TOLERANT: WeightProfile = WeightProfile {
        semantic: 0.4,
        trigram: 0.6,
        specific: false,
    };
    pub const BALANCED: WeightProfile = WeightProfile {
        semantic: 0.55,
        trigram: 0.45,
        specific: false,
    };
}

/// Classify query text into a weighting profile
pub fn classify_query(query: &str) -> WeightProfile {
    let normalized = dishcovery_text::normalize_text(query);
    let word_count = normalize(query).len();
    let has_vibe = VIBE_WORDS.is_match(&normalized);

    if has_vibe {
        return WeightProfile::VIBE;
    }

    let specific = (2..=4).contains(&word_count);
    if word_count <= 3 || mentions_dish_name(&normalized) {
        return WeightProfile {
            specific,
            ..WeightProfile::TYPO_TOLERANT
        };
    }

    WeightProfile {
        specific,
        ..WeightProfile::BALANCED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vibe_query() {
        let profile = classify_query("something cozy for a rainy evening");
        assert_eq!(profile.semantic, 0.7);
        assert_eq!(profile.trigram, 0.3);
        assert!(!profile.specific);
    }

    #[test]
    fn test_short_query_is_typo_tolerant() {
        let profile = classify_query("butter chicken");
        assert_eq!(profile.trigram, 0.6);
        assert!(profile.specific);
    }

    #[test]
    fn test_single_word_not_specific() {
        let profile = classify_query("pizza");
        assert_eq!(profile.trigram, 0.6);
        assert!(!profile.specific);
    }

    #[test]
    fn test_long_plain_query_is_balanced() {
        let profile = classify_query("dishes without onion and garlic from north india");
        assert_eq!(profile.semantic, 0.55);
        assert_eq!(profile.trigram, 0.45);
    }

    #[test]
    fn test_dish_name_in_long_query_still_typo_tolerant() {
        let profile = classify_query("pizza with extra cheese and mushrooms on top");
        assert_eq!(profile.trigram, 0.6);
    }

    #[test]
    fn test_protein_word_counts_as_dish_name() {
        let profile = classify_query("chicken dishes without onion and garlic from north india");
        assert_eq!(profile.trigram, 0.6);
    }
}
