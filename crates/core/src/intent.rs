//! Intent: the structured extraction of one user utterance
//!
//! Created once per turn by the intent extractor and immutable afterward.
//! Two invariants hold for every constructed intent:
//! - a non-empty `dish_query` forces `is_vague` to false
//! - `hard_tags` are strict constraints that retrieval may only satisfy
//!   with explicit tag-table evidence, never inferred from free text

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Strict dietary/allergen constraints requiring explicit tag evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardTag {
    Halal,
    Satvik,
    GlutenFree,
    NutFree,
    LactoseFree,
    Vegan,
    Vegetarian,
}

impl HardTag {
    /// Tag slug as stored in the tag table
    pub fn slug(&self) -> &'static str {
        match self {
            HardTag::Halal => "halal",
            HardTag::Satvik => "satvik",
            HardTag::GlutenFree => "gluten-free",
            HardTag::NutFree => "nut-free",
            HardTag::LactoseFree => "lactose-free",
            HardTag::Vegan => "vegan",
            HardTag::Vegetarian => "vegetarian",
        }
    }

    /// Parse a canonical dietary term into a hard tag, if it is one
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "halal" => Some(HardTag::Halal),
            "satvik" | "sattvic" => Some(HardTag::Satvik),
            "gluten-free" => Some(HardTag::GlutenFree),
            "nut-free" => Some(HardTag::NutFree),
            "lactose-free" => Some(HardTag::LactoseFree),
            "vegan" => Some(HardTag::Vegan),
            "vegetarian" => Some(HardTag::Vegetarian),
            _ => None,
        }
    }
}

/// Normalized extraction of one user utterance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intent {
    /// Cleaned dish search term, None for tag-only or non-search turns
    pub dish_query: Option<String>,
    /// City constraint, if any
    pub city: Option<String>,
    /// Canonical dietary terms found in the current utterance
    pub dietary: Vec<String>,
    /// Allergy terms found in the current utterance
    pub allergy: Vec<String>,
    /// Ingredient terms ("with paneer", "no onion")
    pub ingredients: Vec<String>,
    /// Strict constraints requiring tag-table evidence
    pub hard_tags: Vec<HardTag>,
    /// Price ceiling in SEK
    pub price_max: Option<u32>,
    /// Detected language of the utterance
    pub language: Language,
    /// True when the query names no dish and carries no usable constraint
    pub is_vague: bool,
    /// True when the utterance refers back to previously shown results
    pub is_followup: bool,
    /// True when the utterance looks like a bare restaurant name
    pub is_restaurant_lookup: bool,
    /// Validated restaurant name, if one appears in the utterance
    pub restaurant_name: Option<String>,
    /// Explicit full-menu request
    pub show_menu: bool,
    /// Explicit request to leave restaurant focus
    pub exit_restaurant: bool,
    /// Cuisine hint ("indian", "thai")
    pub cuisine: Option<String>,
}

impl Intent {
    /// Minimal fallback intent used when the completion call fails:
    /// just the trimmed raw query plus whatever the deterministic
    /// heuristics can tell us.
    pub fn fallback(raw_query: &str, is_restaurant_lookup: bool) -> Self {
        let trimmed = raw_query.trim();
        Self {
            dish_query: if trimmed.is_empty() || is_restaurant_lookup {
                None
            } else {
                Some(trimmed.to_string())
            },
            is_restaurant_lookup,
            restaurant_name: if is_restaurant_lookup {
                Some(trimmed.to_string())
            } else {
                None
            },
            ..Default::default()
        }
    }

    /// Enforce the `dish_query` / `is_vague` invariant after construction
    pub fn enforce_invariants(mut self) -> Self {
        if self
            .dish_query
            .as_deref()
            .map(|q| !q.trim().is_empty())
            .unwrap_or(false)
        {
            self.is_vague = false;
        } else if self.dish_query.as_deref().map(str::trim) == Some("") {
            self.dish_query = None;
        }
        self
    }

    /// True when the intent carries no constraint retrieval could act on
    pub fn has_no_constraints(&self) -> bool {
        self.dish_query.is_none()
            && self.dietary.is_empty()
            && self.allergy.is_empty()
            && self.ingredients.is_empty()
            && self.hard_tags.is_empty()
            && self.cuisine.is_none()
            && self.restaurant_name.is_none()
    }

    /// Tag slugs for every hard tag on this intent
    pub fn hard_tag_slugs(&self) -> Vec<String> {
        self.hard_tags.iter().map(|t| t.slug().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dish_query_clears_vague() {
        let intent = Intent {
            dish_query: Some("pizza".to_string()),
            is_vague: true,
            ..Default::default()
        }
        .enforce_invariants();
        assert!(!intent.is_vague);
    }

    #[test]
    fn test_blank_dish_query_nulled() {
        let intent = Intent {
            dish_query: Some("  ".to_string()),
            is_vague: true,
            ..Default::default()
        }
        .enforce_invariants();
        assert!(intent.dish_query.is_none());
        assert!(intent.is_vague);
    }

    #[test]
    fn test_hard_tag_slug_roundtrip() {
        for tag in [
            HardTag::Halal,
            HardTag::Satvik,
            HardTag::GlutenFree,
            HardTag::NutFree,
            HardTag::LactoseFree,
            HardTag::Vegan,
            HardTag::Vegetarian,
        ] {
            assert_eq!(HardTag::from_slug(tag.slug()), Some(tag));
        }
    }

    #[test]
    fn test_fallback_keeps_raw_query() {
        let intent = Intent::fallback("  butter chicken ", false);
        assert_eq!(intent.dish_query.as_deref(), Some("butter chicken"));
        assert!(!intent.is_restaurant_lookup);
    }
}
