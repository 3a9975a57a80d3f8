//! Dietary keyword rules
//!
//! One ordered, named rule table (pattern -> canonical tag) evaluated once
//! per normalization pass. Ordering matters: the vegan rule sits strictly
//! before the vegetarian rule so a vegan query never inherits the weaker
//! vegetarian constraint ("vegan" contains "veg").
//!
//! Patterns are matched against normalized text (lowercased, punctuation
//! stripped), and cover Swedish, German, Finnish and Danish/Norwegian
//! synonyms alongside English.

use once_cell::sync::Lazy;
use regex::Regex;

use dishcovery_core::HardTag;

/// One canonicalization rule in the ordered table
#[derive(Debug)]
pub struct DietaryRule {
    /// Canonical tag slug this rule produces
    pub canonical: &'static str,
    /// Hard-tag mapping when the term is a strict constraint
    pub hard_tag: Option<HardTag>,
    /// Whole-word pattern over normalized text
    pub pattern: Regex,
}

/// The ordered rule table. Vegan precedes vegetarian by construction.
pub static DIETARY_RULES: Lazy<Vec<DietaryRule>> = Lazy::new(|| {
    let rule = |canonical, hard_tag, pattern: &str| DietaryRule {
        canonical,
        hard_tag,
        pattern: Regex::new(pattern).expect("dietary pattern must compile"),
    };
    vec![
        // vegan: vegan, vegansk(t), veganisch, vegaani(nen)
        rule(
            "vegan",
            Some(HardTag::Vegan),
            r"\b(vega+n\w*|plant based|plantbased)\b",
        ),
        // vegetarian: vegetarian, veg, veggie, vegetarisk, vegetarisch,
        // vegetar, kasvis(ruoka), shakahari / शाकाहारी
        rule(
            "vegetarian",
            Some(HardTag::Vegetarian),
            r"\b(vegetar\w*|veg|veggie|kasvis\w*|shakahari|शाकाहारी)\b",
        ),
        rule("halal", Some(HardTag::Halal), r"\b(hala+l|हलाल|حلال)\b"),
        rule("satvik", Some(HardTag::Satvik), r"\b(satvik|sattvic|saatvik)\b"),
        rule(
            "gluten-free",
            Some(HardTag::GlutenFree),
            r"\b(gluten ?free|glutenfri\w*|glutenfrei\w*|gluteeniton|no gluten|without gluten)\b",
        ),
        rule(
            "nut-free",
            Some(HardTag::NutFree),
            r"\b(nut ?free|nötfri\w*|nussfrei\w*|pähkinätön|no nuts)\b",
        ),
        rule(
            "lactose-free",
            Some(HardTag::LactoseFree),
            r"\b(lactose ?free|dairy ?free|laktosfri\w*|laktosefrei\w*|laktoositon|no lactose)\b",
        ),
        // Soft dietary terms: recognized and canonicalized, but not strict
        rule("pescatarian", None, r"\b(pescatarian|pescetarian)\b"),
        rule("jain", None, r"\bjain\b"),
        rule("kosher", None, r"\bkosher\b"),
    ]
});

/// Canonical dietary terms found in the text, in rule order, deduplicated
pub fn detect_dietary(normalized: &str) -> Vec<String> {
    let mut found = Vec::new();
    for rule in DIETARY_RULES.iter() {
        if rule.pattern.is_match(normalized) && !found.contains(&rule.canonical.to_string()) {
            found.push(rule.canonical.to_string());
        }
    }
    found
}

/// Hard tags found in the text, in rule order
///
/// Evaluated over the same ordered table, so a query containing "vegan"
/// yields the vegan tag without a vegetarian tag unless a distinct
/// vegetarian keyword also occurs.
pub fn detect_hard_tags(normalized: &str) -> Vec<HardTag> {
    let mut tags = Vec::new();
    for rule in DIETARY_RULES.iter() {
        if let Some(tag) = rule.hard_tag {
            if rule.pattern.is_match(normalized) && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}

/// Canonicalize a single (possibly non-English) dietary term
pub fn canonicalize_dietary(term: &str) -> Option<&'static str> {
    let normalized = crate::normalize::normalize_text(term);
    DIETARY_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&normalized))
        .map(|rule| rule.canonical)
}

/// Whether the current utterance literally contains a keyword for the
/// given canonical term. Used to validate completion-proposed dietary
/// terms so conversation-history carry-over never survives.
pub fn mentions_dietary(normalized_utterance: &str, canonical: &str) -> bool {
    DIETARY_RULES
        .iter()
        .filter(|rule| rule.canonical == canonical)
        .any(|rule| rule.pattern.is_match(normalized_utterance))
}

/// Remove every dietary keyword from normalized text, collapsing the gaps
pub fn strip_dietary_terms(normalized: &str) -> String {
    let mut text = normalized.to_string();
    for rule in DIETARY_RULES.iter() {
        text = rule.pattern.replace_all(&text, " ").to_string();
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_text;

    #[test]
    fn test_vegan_before_vegetarian() {
        let tags = detect_hard_tags(&normalize_text("vegan pizza"));
        assert_eq!(tags, vec![HardTag::Vegan]);
        assert!(!tags.contains(&HardTag::Vegetarian));
    }

    #[test]
    fn test_vegan_detection_idempotent() {
        let text = normalize_text("vegan pizza");
        assert_eq!(detect_hard_tags(&text), detect_hard_tags(&text));
    }

    #[test]
    fn test_veg_maps_to_vegetarian() {
        assert_eq!(detect_dietary(&normalize_text("veg pizza")), vec!["vegetarian"]);
    }

    #[test]
    fn test_both_terms_present() {
        let tags = detect_hard_tags(&normalize_text("vegan or vegetarian options"));
        assert_eq!(tags, vec![HardTag::Vegan, HardTag::Vegetarian]);
    }

    #[test]
    fn test_swedish_synonyms() {
        assert_eq!(detect_dietary(&normalize_text("vegansk pizza")), vec!["vegan"]);
        assert_eq!(
            detect_dietary(&normalize_text("vegetarisk lasagne")),
            vec!["vegetarian"]
        );
        assert_eq!(
            detect_dietary(&normalize_text("glutenfri pasta")),
            vec!["gluten-free"]
        );
    }

    #[test]
    fn test_german_finnish_synonyms() {
        assert_eq!(detect_dietary(&normalize_text("vegetarisches Essen")), vec!["vegetarian"]);
        assert_eq!(detect_dietary(&normalize_text("kasvisruoka")), vec!["vegetarian"]);
        assert_eq!(detect_dietary(&normalize_text("vegaaninen pizza")), vec!["vegan"]);
        assert_eq!(detect_dietary(&normalize_text("laktosefreies Eis")), vec!["lactose-free"]);
    }

    #[test]
    fn test_devanagari_vegetarian() {
        assert_eq!(detect_dietary(&normalize_text("शाकाहारी पिज़्ज़ा")), vec!["vegetarian"]);
    }

    #[test]
    fn test_canonicalize_single_term() {
        assert_eq!(canonicalize_dietary("Vegansk"), Some("vegan"));
        assert_eq!(canonicalize_dietary("kasvis"), Some("vegetarian"));
        assert_eq!(canonicalize_dietary("random"), None);
    }

    #[test]
    fn test_mentions_validates_against_utterance() {
        let utterance = normalize_text("pizza please");
        // "vegetarian" proposed by the completion from history must not survive
        assert!(!mentions_dietary(&utterance, "vegetarian"));
        assert!(mentions_dietary(&normalize_text("veg pizza"), "vegetarian"));
    }

    #[test]
    fn test_strip_dietary_terms() {
        assert_eq!(strip_dietary_terms(&normalize_text("vegan pizza")), "pizza");
        assert_eq!(strip_dietary_terms(&normalize_text("gluten free pasta")), "pasta");
    }

    #[test]
    fn test_halal_detection() {
        assert_eq!(detect_hard_tags(&normalize_text("is it halal?")), vec![HardTag::Halal]);
        assert_eq!(detect_hard_tags(&normalize_text("حلال")), vec![HardTag::Halal]);
    }
}
