//! Deterministic extraction rules
//!
//! These run after (and independently of) the completion draft. They are
//! the authority wherever they overlap with it: the lookup heuristic, the
//! menu-request patterns and the exit phrases are deterministic by design
//! so that their behavior is auditable per rule.

use once_cell::sync::Lazy;
use regex::Regex;

use dishcovery_text::{
    detect_dietary, leftover_tokens, mentions_dish_name, normalize, normalize_text, ScriptDetector,
};

/// Interrogatives across the supported languages; a query containing one
/// is a question, not a restaurant name.
static QUESTION_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(what|which|where|when|why|how|who|is|are|am|do|does|did|can|could|will|would|kya|ki|kaise|kitna|vad|var|hur|was|wo|wie|mikä|missä|hvad|hvor)\b",
    )
    .expect("question pattern must compile")
});

/// Prepositions that anchor a location phrase ("pizza in Malmö")
static LOCATION_PREPOSITIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(in|near|at|around|close to|nära|i|nel|bei)\b").expect("location pattern must compile")
});

/// Verbs that signal food intent even next to a restaurant name
/// ("does Indian Bites have pizza")
static FOOD_INTENT_VERBS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(have|has|serve|serves|serving|offer|offers|sell|sells|make|makes|cook|cooks)\b")
        .expect("food-intent pattern must compile")
});

/// Place-level fact vocabulary: hours, address, phone, accessibility
static PLACE_FACT_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(hours|open|opens|opening|closed|closes|closing|address|located|location|phone|number|call|parking|wheelchair|accessible|accessibility|website|book|booking|reservation)\b",
    )
    .expect("place-fact pattern must compile")
});

/// Explicit full-menu request phrasings
static MENU_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b((show|pull|open|get|see|view|visa|zeige)( me)?( up)?( the)?( full| whole| entire)? (menu|meny|menyn|speisekarte)|full menu|whole menu|entire menu|menu dikhao)\b",
    )
    .expect("menu pattern must compile")
});

/// Phrases asking to leave restaurant focus
static EXIT_PHRASES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(go back|exit|leave|back to (results|search|restaurants)|other restaurants|somewhere else|different (place|restaurant))\b",
    )
    .expect("exit pattern must compile")
});

/// Pronoun-anchored follow-up phrasing ("is it halal", "do they have")
static FOLLOWUP_PRONOUNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(it|its|they|them|those|these|that one|this one)\b")
        .expect("followup pattern must compile")
});

/// Whether text contains only Latin-script letters (accented included)
pub fn is_latin_only(text: &str) -> bool {
    !ScriptDetector::new().has_non_latin(text)
}

/// Whether the query carries food-intent signals: food verbs, dietary
/// terms or common dish names
pub fn has_food_intent(normalized: &str) -> bool {
    FOOD_INTENT_VERBS.is_match(normalized)
        || mentions_dish_name(normalized)
        || !detect_dietary(normalized).is_empty()
}

/// Whether the query asks for place-level facts rather than food
pub fn asks_place_facts(normalized: &str) -> bool {
    PLACE_FACT_WORDS.is_match(normalized)
}

/// Deterministic restaurant-lookup heuristic
///
/// A short Latin-script query (1-5 tokens) free of question words,
/// dietary words, dish names and location prepositions reads as a
/// restaurant name. Food-intent signals override back to a dish search
/// even when a restaurant name co-occurs, unless the query asks for
/// place-level facts.
pub fn is_restaurant_lookup(query: &str) -> bool {
    if !is_latin_only(query) {
        return false;
    }
    let normalized = normalize_text(query);
    let tokens = normalize(query);
    if tokens.is_empty() || tokens.len() > 5 {
        return false;
    }
    if has_food_intent(&normalized) {
        return asks_place_facts(&normalized);
    }
    if QUESTION_WORDS.is_match(&normalized) || LOCATION_PREPOSITIONS.is_match(&normalized) {
        return false;
    }
    if mentions_dish_name(&normalized) || !detect_dietary(&normalized).is_empty() {
        return false;
    }
    if is_exit_phrase(&normalized) || MENU_REQUEST.is_match(&normalized) {
        return false;
    }
    true
}

/// Explicit menu request; a bare "menu" counts only inside a focused
/// restaurant
pub fn is_menu_request(normalized: &str, focused: bool) -> bool {
    if MENU_REQUEST.is_match(normalized) {
        return true;
    }
    focused && matches!(normalized.trim(), "menu" | "meny" | "menyn" | "speisekarte")
}

/// Explicit request to leave restaurant focus
pub fn is_exit_phrase(normalized: &str) -> bool {
    EXIT_PHRASES.is_match(normalized)
}

/// Pronoun-anchored follow-up phrasing
pub fn is_followup_phrase(normalized: &str) -> bool {
    FOLLOWUP_PRONOUNS.is_match(normalized) && QUESTION_WORDS.is_match(normalized)
}

/// Strip dietary keywords and filler from a dish query once dietary
/// intent is captured separately. Nothing meaningful left means tag-only
/// search.
pub fn clean_dish_query(raw: &str) -> Option<String> {
    let tokens = leftover_tokens(raw);
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name_is_lookup() {
        assert!(is_restaurant_lookup("Indian Bites"));
        assert!(is_restaurant_lookup("La Piazza"));
    }

    #[test]
    fn test_dish_words_block_lookup() {
        assert!(!is_restaurant_lookup("butter chicken"));
        assert!(!is_restaurant_lookup("veg pizza"));
    }

    #[test]
    fn test_question_words_block_lookup() {
        assert!(!is_restaurant_lookup("where is Indian Bites"));
    }

    #[test]
    fn test_location_preposition_blocks_lookup() {
        assert!(!is_restaurant_lookup("thai in Lund"));
    }

    #[test]
    fn test_too_long_blocks_lookup() {
        assert!(!is_restaurant_lookup(
            "some place my friend told me about last week"
        ));
    }

    #[test]
    fn test_food_verb_overrides_name() {
        assert!(!is_restaurant_lookup("does Indian Bites serve pizza"));
    }

    #[test]
    fn test_place_facts_stay_lookup() {
        // Asking about hours is place-level even with food words around
        assert!(is_restaurant_lookup("Indian Bites opening hours"));
    }

    #[test]
    fn test_non_latin_never_lookup() {
        assert!(!is_restaurant_lookup("शाकाहारी खाना"));
    }

    #[test]
    fn test_menu_request_variants() {
        assert!(is_menu_request(&normalize_text("show me the full menu"), false));
        assert!(is_menu_request(&normalize_text("pull up the menu"), false));
        assert!(is_menu_request(&normalize_text("visa menyn"), false));
        assert!(is_menu_request("menu", true));
        assert!(!is_menu_request("menu", false));
    }

    #[test]
    fn test_exit_phrases() {
        assert!(is_exit_phrase(&normalize_text("go back to results")));
        assert!(is_exit_phrase(&normalize_text("show me other restaurants")));
        assert!(!is_exit_phrase(&normalize_text("pizza please")));
    }

    #[test]
    fn test_followup_phrase() {
        assert!(is_followup_phrase(&normalize_text("is it halal?")));
        assert!(is_followup_phrase(&normalize_text("do they have naan")));
        assert!(!is_followup_phrase(&normalize_text("vegan pizza")));
    }

    #[test]
    fn test_clean_dish_query() {
        assert_eq!(clean_dish_query("veg pizza").as_deref(), Some("pizza"));
        assert_eq!(
            clean_dish_query("I want some butter chicken please").as_deref(),
            Some("butter chicken")
        );
        assert_eq!(clean_dish_query("something vegetarian"), None);
    }
}
