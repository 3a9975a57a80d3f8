//! Shared food vocabulary
//!
//! One table of common dish-name words, used by the restaurant-lookup
//! heuristic (a query naming a dish is not a restaurant name) and by the
//! retrieval weighting profile (dish-name queries get typo-tolerant
//! trigram weighting).

use once_cell::sync::Lazy;
use regex::Regex;

/// Common dish-name words across the cuisines the catalog carries
pub static COMMON_DISH_NAMES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(pizza|pasta|burger|sushi|ramen|biryani|curry|kebab|falafel|taco|tacos|noodles|dumplings|samosa|dosa|dal|naan|paneer|tikka|masala|korma|lasagne|lasagna|salad|soup|wrap|bowl|shawarma|pho|paella|risotto|chicken|lamb|beef|tofu|pancake|waffle|sandwich|fries|springroll|momo|thali)\b",
    )
    .expect("dish-name pattern must compile")
});

/// Whether any common dish-name word occurs in normalized text
pub fn mentions_dish_name(normalized: &str) -> bool {
    COMMON_DISH_NAMES.is_match(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dish_words_detected() {
        assert!(mentions_dish_name("butter chicken"));
        assert!(mentions_dish_name("margherita pizza"));
        assert!(!mentions_dish_name("indian bites"));
    }
}
