//! Result finalizer / shaper
//!
//! Pure, stateless transform between retrieval and response assembly.
//! Focus isolation comes first and is absolute; match filtering and the
//! strict-vegan check come next; bounding and truncation metadata last, so
//! the caller can render "load more" without re-querying.

use std::collections::HashMap;
use uuid::Uuid;

use dishcovery_core::{
    ChatState, DishMatch, HybridCandidate, RestaurantCard, Truncation,
};
use dishcovery_text::{fuzzy_token_match, normalize};

/// Bounds applied when shaping the response
#[derive(Debug, Clone)]
pub struct ShaperConfig {
    pub max_restaurants: usize,
    pub max_dishes_per_restaurant: usize,
}

impl Default for ShaperConfig {
    fn default() -> Self {
        Self {
            max_restaurants: 5,
            max_dishes_per_restaurant: 4,
        }
    }
}

/// What the dishes must match to survive shaping
#[derive(Debug, Clone, Default)]
pub struct MatchCriteria {
    /// Tokenized dish query to re-validate against, if a dish was asked for
    pub dish_query: Option<String>,
    /// Strict vegan intent: requires the `vegan` slug specifically,
    /// never satisfied by `vegetarian`
    pub strict_vegan: bool,
    /// Whether any dietary constraint was active this turn
    pub dietary_active: bool,
}

/// Shaped, size-capped response payload
#[derive(Debug, Clone)]
pub struct ShapedResults {
    pub cards: Vec<RestaurantCard>,
    pub truncation: Truncation,
}

fn dish_matches_query(candidate: &HybridCandidate, query_tokens: &[String]) -> bool {
    if query_tokens.is_empty() {
        return true;
    }
    let mut haystack_tokens = normalize(&candidate.dish_name);
    if let Some(ref desc) = candidate.description {
        haystack_tokens.extend(normalize(desc));
    }
    let matched = query_tokens
        .iter()
        .filter(|qt| haystack_tokens.iter().any(|ht| fuzzy_token_match(qt, ht)))
        .count();
    let required = if query_tokens.len() >= 2 { 2 } else { 1 };
    matched >= required
}

/// Shape fused candidates into bounded restaurant cards
///
/// `tags` carries the DB-backed tag slugs per dish id; the strict-vegan
/// check reads only from it, never from dish text.
pub fn finalize_results(
    candidates: &[HybridCandidate],
    tags: &HashMap<Uuid, Vec<String>>,
    criteria: &MatchCriteria,
    chat_state: &ChatState,
    config: &ShaperConfig,
) -> ShapedResults {
    // Focus isolation: inside a restaurant, nothing from anywhere else
    // survives, whatever its score.
    let focused: Vec<&HybridCandidate> = match (chat_state.is_focused(), chat_state.current_restaurant_id)
    {
        (true, Some(focus_id)) => candidates
            .iter()
            .filter(|c| c.restaurant_id == focus_id)
            .collect(),
        _ => candidates.iter().collect(),
    };

    let query_tokens = criteria
        .dish_query
        .as_deref()
        .map(normalize)
        .unwrap_or_default();

    let surviving: Vec<&HybridCandidate> = focused
        .into_iter()
        .filter(|c| dish_matches_query(c, &query_tokens))
        .filter(|c| {
            if !criteria.strict_vegan {
                return true;
            }
            tags.get(&c.dish_id)
                .map(|slugs| slugs.iter().any(|s| s == "vegan"))
                .unwrap_or(false)
        })
        .collect();

    // Group by restaurant, preserving score order within and across groups
    let mut card_order: Vec<Uuid> = Vec::new();
    let mut grouped: HashMap<Uuid, Vec<&HybridCandidate>> = HashMap::new();
    for candidate in surviving.iter() {
        if !card_order.contains(&candidate.restaurant_id) {
            card_order.push(candidate.restaurant_id);
        }
        grouped
            .entry(candidate.restaurant_id)
            .or_default()
            .push(candidate);
    }

    let total_found: usize = grouped.values().map(|dishes| dishes.len()).sum();

    let mut cards = Vec::new();
    let mut total_returned = 0usize;
    for restaurant_id in card_order.into_iter().take(config.max_restaurants) {
        let dishes = &grouped[&restaurant_id];
        let offset = chat_state
            .pagination
            .get(&restaurant_id)
            .copied()
            .unwrap_or(0)
            .min(dishes.len());
        let page: Vec<DishMatch> = dishes
            .iter()
            .skip(offset)
            .take(config.max_dishes_per_restaurant)
            .map(|c| DishMatch {
                dish_id: c.dish_id,
                name: c.dish_name.clone(),
                description: c.description.clone(),
                section_name: c.section_name.clone(),
                price_sek: c.price_sek,
                tag_slugs: tags.get(&c.dish_id).cloned().unwrap_or_default(),
                score: c.final_score,
            })
            .collect();
        if page.is_empty() {
            continue;
        }
        let shown = page.len();
        total_returned += shown;
        let next = offset + shown;
        cards.push(RestaurantCard {
            restaurant_id,
            name: dishes[0].restaurant_name.clone(),
            dishes: page,
            shown,
            total: dishes.len(),
            next_offset: if next < dishes.len() { Some(next) } else { None },
        });
    }

    ShapedResults {
        truncation: Truncation {
            total_found,
            total_returned,
            truncated: total_returned < total_found,
        },
        cards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dishcovery_core::{CandidateSource, ChatMode};

    fn candidate(
        name: &str,
        restaurant_id: Uuid,
        restaurant_name: &str,
        score: f32,
    ) -> HybridCandidate {
        HybridCandidate {
            dish_id: Uuid::new_v4(),
            dish_name: name.to_string(),
            restaurant_id,
            restaurant_name: restaurant_name.to_string(),
            description: None,
            section_name: None,
            price_sek: Some(129),
            semantic_score: Some(score),
            trigram_score: None,
            final_score: score,
            source: CandidateSource::Semantic,
        }
    }

    #[test]
    fn test_focus_isolation_is_absolute() {
        let focus_id = Uuid::new_v4();
        let other_id = Uuid::new_v4();
        let candidates = vec![
            // Higher-scoring cross-restaurant match must still be dropped
            candidate("Margherita Pizza", other_id, "Pizza Palace", 0.99),
            candidate("Paneer Pizza", focus_id, "Indian Bites", 0.4),
        ];
        let mut chat = ChatState::default();
        chat.enter_restaurant(focus_id);
        chat.mode = ChatMode::Restaurant;

        let shaped = finalize_results(
            &candidates,
            &HashMap::new(),
            &MatchCriteria {
                dish_query: Some("pizza".to_string()),
                ..Default::default()
            },
            &chat,
            &ShaperConfig::default(),
        );
        assert_eq!(shaped.cards.len(), 1);
        assert!(shaped
            .cards
            .iter()
            .all(|card| card.restaurant_id == focus_id));
    }

    #[test]
    fn test_strict_vegan_rejects_vegetarian_only() {
        let rid = Uuid::new_v4();
        let vegan_dish = candidate("Vegan Burger", rid, "Green Spot", 0.8);
        let veggie_dish = candidate("Margherita (VE)", rid, "Green Spot", 0.9);
        let mut tags = HashMap::new();
        tags.insert(vegan_dish.dish_id, vec!["vegan".to_string()]);
        tags.insert(veggie_dish.dish_id, vec!["vegetarian".to_string()]);

        let shaped = finalize_results(
            &[vegan_dish, veggie_dish],
            &tags,
            &MatchCriteria {
                strict_vegan: true,
                dietary_active: true,
                ..Default::default()
            },
            &ChatState::default(),
            &ShaperConfig::default(),
        );
        assert_eq!(shaped.cards.len(), 1);
        assert_eq!(shaped.cards[0].dishes.len(), 1);
        assert_eq!(shaped.cards[0].dishes[0].name, "Vegan Burger");
    }

    #[test]
    fn test_multi_token_query_needs_two_matches() {
        let rid = Uuid::new_v4();
        let shaped = finalize_results(
            &[
                candidate("Butter Chicken", rid, "Curry House", 0.9),
                candidate("Butter Naan", rid, "Curry House", 0.8),
            ],
            &HashMap::new(),
            &MatchCriteria {
                dish_query: Some("butter chicken".to_string()),
                ..Default::default()
            },
            &ChatState::default(),
            &ShaperConfig::default(),
        );
        let names: Vec<&str> = shaped.cards[0]
            .dishes
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Butter Chicken"]);
    }

    #[test]
    fn test_bounding_and_truncation_metadata() {
        let rid = Uuid::new_v4();
        let candidates: Vec<HybridCandidate> = (0..7)
            .map(|i| candidate(&format!("Pizza {}", i), rid, "Pizza Palace", 0.9))
            .collect();
        let shaped = finalize_results(
            &candidates,
            &HashMap::new(),
            &MatchCriteria {
                dish_query: Some("pizza".to_string()),
                ..Default::default()
            },
            &ChatState::default(),
            &ShaperConfig::default(),
        );
        let card = &shaped.cards[0];
        assert_eq!(card.shown, 4);
        assert_eq!(card.total, 7);
        assert_eq!(card.next_offset, Some(4));
        assert_eq!(shaped.truncation.total_found, 7);
        assert_eq!(shaped.truncation.total_returned, 4);
        assert!(shaped.truncation.truncated);
    }

    #[test]
    fn test_pagination_offset_respected() {
        let rid = Uuid::new_v4();
        let candidates: Vec<HybridCandidate> = (0..6)
            .map(|i| candidate(&format!("Pizza {}", i), rid, "Pizza Palace", 0.9))
            .collect();
        let mut chat = ChatState::default();
        chat.pagination.insert(rid, 4);

        let shaped = finalize_results(
            &candidates,
            &HashMap::new(),
            &MatchCriteria {
                dish_query: Some("pizza".to_string()),
                ..Default::default()
            },
            &chat,
            &ShaperConfig::default(),
        );
        let card = &shaped.cards[0];
        assert_eq!(card.shown, 2);
        assert_eq!(card.next_offset, None);
        assert_eq!(card.dishes[0].name, "Pizza 4");
    }

    #[test]
    fn test_no_constraint_keeps_all_cards() {
        let shaped = finalize_results(
            &[candidate("Anything", Uuid::new_v4(), "Somewhere", 0.5)],
            &HashMap::new(),
            &MatchCriteria::default(),
            &ChatState::default(),
            &ShaperConfig::default(),
        );
        assert_eq!(shaped.cards.len(), 1);
    }
}
