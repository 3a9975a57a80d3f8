//! Post-retrieval token precision filter
//!
//! Given the leftover query tokens after dietary and filler stripping,
//! keeps only rows where every remaining token appears somewhere in the
//! dish name, description or section name. Catches the single-token false
//! positives score fusion alone would let through.

use dishcovery_core::HybridCandidate;
use dishcovery_text::{fuzzy_token_match, normalize};

/// Keep only candidates containing every leftover token
///
/// An empty token list disables the filter; a filter that would wipe out
/// the entire candidate set is the caller's zero-result case, not an
/// error.
pub fn apply_token_filter(
    candidates: Vec<HybridCandidate>,
    leftover_tokens: &[String],
) -> Vec<HybridCandidate> {
    if leftover_tokens.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|c| {
            let haystack_tokens = normalize(&c.haystack());
            leftover_tokens.iter().all(|token| {
                haystack_tokens
                    .iter()
                    .any(|ht| fuzzy_token_match(token, ht))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dishcovery_core::CandidateSource;
    use uuid::Uuid;

    fn candidate(name: &str, description: Option<&str>, section: Option<&str>) -> HybridCandidate {
        HybridCandidate {
            dish_id: Uuid::new_v4(),
            dish_name: name.to_string(),
            restaurant_id: Uuid::new_v4(),
            restaurant_name: "Test Kitchen".to_string(),
            description: description.map(str::to_string),
            section_name: section.map(str::to_string),
            price_sek: None,
            semantic_score: Some(0.7),
            trigram_score: None,
            final_score: 0.7,
            source: CandidateSource::Semantic,
        }
    }

    #[test]
    fn test_every_token_must_appear() {
        let kept = apply_token_filter(
            vec![
                candidate("Margherita Pizza", None, None),
                candidate("Chicken Soup", None, None),
            ],
            &["pizza".to_string()],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].dish_name, "Margherita Pizza");
    }

    #[test]
    fn test_description_and_section_count() {
        let kept = apply_token_filter(
            vec![candidate(
                "Margherita",
                Some("classic pizza with tomato"),
                None,
            )],
            &["pizza".to_string()],
        );
        assert_eq!(kept.len(), 1);

        let kept = apply_token_filter(
            vec![candidate("Margherita", None, Some("Pizzas"))],
            &["pizza".to_string()],
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_empty_tokens_disable_filter() {
        let kept = apply_token_filter(vec![candidate("Anything", None, None)], &[]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_multi_token_requires_all() {
        let kept = apply_token_filter(
            vec![candidate("Butter Naan", None, None)],
            &["butter".to_string(), "chicken".to_string()],
        );
        assert!(kept.is_empty());
    }
}
