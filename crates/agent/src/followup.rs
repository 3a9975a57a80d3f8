//! Followup resolver: answers questions about dishes already on screen
//!
//! Runs before intent extraction whenever the session is grounded. Every
//! branch is deterministic and answers only from grounded state or the
//! tag table; anything it cannot answer safely falls through as
//! `NotHandled` and goes to the planner as a fresh turn.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

use dishcovery_core::{DishStore, GroundedState, Language, LastResultDish};
use dishcovery_text::{detect_hard_tags, fuzzy_token_match, normalize, normalize_text, strip_filler};

/// Verdict of a dish attribute question ("is it spicy?")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeVerdict {
    Yes,
    No,
    /// The menu text carries no evidence either way
    NoData,
}

/// What the resolver decided for this turn
#[derive(Debug, Clone, PartialEq)]
pub enum FollowupOutcome {
    /// Re-present the last results in another language
    Translate { target: Language },
    /// Answer about a dish attribute, judged from menu text evidence
    Attribute {
        dish: String,
        attribute: String,
        verdict: AttributeVerdict,
    },
    /// Open one of the grounded restaurants
    ShowRestaurant {
        restaurant_id: Option<Uuid>,
        name: String,
    },
    /// Advance pagination over the last result set
    Paginate,
    /// Yes/no tag question answered from the tag table
    TagAnswer {
        dish: String,
        tag: String,
        present: bool,
    },
    /// Full allergen listing for one dish
    AllergenList { dish: String, allergens: Vec<String> },
    /// The question is ambiguous across several shown dishes
    Clarify { candidates: Vec<String> },
    /// Not a followup this resolver handles; plan it as a fresh turn
    NotHandled,
}

static TRANSLATE_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:translate|(?:in|to|på|auf) (english|swedish|german|finnish|danish|hindi|punjabi|urdu|russian|engelska|svenska|tyska|deutsch))\b",
    )
    .expect("translate pattern must compile")
});

/// Plural phrasing over the result set; never answerable as a
/// single-dish question
static PLURAL_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(which (of (these|them|those)|ones)|any of (these|them|those)|all of them|how many)\b")
        .expect("plural pattern must compile")
});

static SHOW_MORE_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:more|menu|dishes|items|options|else)\s+(?:from|of|at)\s+(.+)$")
        .expect("show-more-from pattern must compile")
});

static PAGINATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(show more|more options|next|what else|anything else|others|visa fler|mehr)\b|^more$")
        .expect("paginate pattern must compile")
});

static ALLERGEN_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(what|which|list|any|all)\b.*\ballergens?\b|\ballergens?\?")
        .expect("allergen-list pattern must compile")
});

/// Attribute vocabulary with the menu-text evidence that confirms each
static ATTRIBUTE_EVIDENCE: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("spicy", r"\b(spicy|spiced|chili|chilli|jalape\w*|sriracha|peri|hot sauce|masala)\b"),
        ("creamy", r"\b(cream|creamy|butter|makhani|alfredo)\b"),
        ("sweet", r"\b(sweet|honey|sugar|caramel)\b"),
        ("mild", r"\b(mild)\b"),
        ("fried", r"\b(fried|crispy|battered|tempura)\b"),
        ("grilled", r"\b(grilled|tandoori|charcoal|barbecue|bbq)\b"),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        (
            name,
            Regex::new(pattern).expect("attribute evidence must compile"),
        )
    })
    .collect()
});

static ATTRIBUTE_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(spicy|hot|creamy|sweet|mild|fried|crispy|grilled)\b")
        .expect("attribute pattern must compile")
});

/// Interrogative phrasing. Attribute and tag branches answer questions
/// about shown dishes only; a statement like "vegan pizza" is a new
/// query and belongs to the planner.
static QUESTION_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(is|are|was|were|does|do|did|has|have|can|could|would|what|which|how|any)\b",
    )
    .expect("question pattern must compile")
});

/// Question/filler words ignored when looking for a dish reference
static NON_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(is|are|was|does|do|did|it|its|this|that|these|those|one|the|a|an|very|really|how|what|which|have|has|contain|contains|any|in|with|of|them|they|there|i|me|spicy|hot|creamy|sweet|mild|fried|crispy|grilled|vegan|vegetarian|halal|gluten|lactose|nut|nuts|free|allergen|allergens|dish|food)$",
    )
    .expect("non-content pattern must compile")
});

/// Allergen vocabulary mapped to tag slugs
const ALLERGEN_TERMS: &[(&str, &str)] = &[
    ("nut", "nuts"),
    ("nuts", "nuts"),
    ("peanut", "peanuts"),
    ("peanuts", "peanuts"),
    ("gluten", "gluten"),
    ("lactose", "lactose"),
    ("dairy", "lactose"),
    ("milk", "lactose"),
    ("egg", "egg"),
    ("eggs", "egg"),
    ("soy", "soy"),
    ("shellfish", "shellfish"),
    ("fish", "fish"),
    ("sesame", "sesame"),
];

/// Tag slugs treated as allergens when listing
const ALLERGEN_SLUGS: &[&str] = &[
    "nuts", "peanuts", "gluten", "lactose", "egg", "soy", "shellfish", "fish", "sesame",
];

fn language_from_name(name: &str) -> Option<Language> {
    match name {
        "english" | "engelska" => Some(Language::En),
        "swedish" | "svenska" => Some(Language::Sv),
        "german" | "tyska" | "deutsch" => Some(Language::De),
        "finnish" => Some(Language::Fi),
        "danish" => Some(Language::Da),
        "hindi" => Some(Language::Hi),
        "punjabi" => Some(Language::Pa),
        "urdu" => Some(Language::Ur),
        "russian" => Some(Language::Ru),
        _ => None,
    }
}

/// How the utterance refers to a grounded dish, if at all
enum DishReference<'a> {
    /// Tokens name exactly one grounded dish
    Named(&'a LastResultDish),
    /// No naming tokens; the single grounded dish is the obvious referent
    Implicit(&'a LastResultDish),
    /// No naming tokens and several dishes could be meant
    Ambiguous(Vec<&'a LastResultDish>),
    /// Naming tokens are present but match nothing shown
    Mismatch,
}

fn content_tokens(normalized: &str) -> Vec<String> {
    strip_filler(&normalize(normalized))
        .into_iter()
        .filter(|t| !NON_CONTENT.is_match(t))
        .collect()
}

fn resolve_dish_reference<'a>(
    normalized: &str,
    grounded: &'a GroundedState,
) -> DishReference<'a> {
    let tokens = content_tokens(normalized);
    if tokens.is_empty() {
        return match grounded.last_dishes.as_slice() {
            [only] => DishReference::Implicit(only),
            dishes => DishReference::Ambiguous(dishes.iter().collect()),
        };
    }

    let mut best_count = 0;
    let mut best: Vec<&LastResultDish> = Vec::new();
    for dish in &grounded.last_dishes {
        let name_tokens = normalize(&dish.name);
        let matched = tokens
            .iter()
            .filter(|qt| name_tokens.iter().any(|nt| fuzzy_token_match(qt, nt)))
            .count();
        if matched == 0 {
            continue;
        }
        if matched > best_count {
            best_count = matched;
            best = vec![dish];
        } else if matched == best_count {
            best.push(dish);
        }
    }
    // A tied best match names several dishes equally well; guessing one
    // would answer about the wrong dish.
    match best.len() {
        0 => DishReference::Mismatch,
        1 => DishReference::Named(best[0]),
        _ => DishReference::Ambiguous(best),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FollowupResolver;

impl FollowupResolver {
    pub fn new() -> Self {
        Self
    }

    /// Try to resolve the turn against the grounded results. Returns
    /// `NotHandled` whenever a fresh plan is the safer route.
    pub async fn resolve(
        &self,
        query: &str,
        grounded: &GroundedState,
        store: &dyn DishStore,
    ) -> FollowupOutcome {
        let normalized = normalize_text(query);
        // `?` survives only in the raw text; normalization strips it
        let interrogative = QUESTION_PHRASE.is_match(&normalized) || query.contains('?');

        if let Some(target) = self.translation_target(&normalized) {
            return FollowupOutcome::Translate { target };
        }

        // Plural questions span the result set; the planner handles them
        // as a filtered search.
        if PLURAL_INTENT.is_match(&normalized) {
            debug!("plural phrasing, deferring to planner");
            return FollowupOutcome::NotHandled;
        }

        if interrogative {
            if let Some(outcome) = self.attribute_question(&normalized, grounded) {
                return outcome;
            }
        }

        if let Some(outcome) = self.show_restaurant(&normalized, grounded) {
            return outcome;
        }

        if PAGINATE.is_match(&normalized) {
            return FollowupOutcome::Paginate;
        }

        if interrogative {
            if let Some(outcome) = self.tag_question(&normalized, grounded, store).await {
                return outcome;
            }
        }

        FollowupOutcome::NotHandled
    }

    fn translation_target(&self, normalized: &str) -> Option<Language> {
        let captures = TRANSLATE_REQUEST.captures(normalized)?;
        match captures.get(1) {
            Some(name) => language_from_name(name.as_str()),
            // bare "translate" with no language defaults to English
            None => Some(Language::En),
        }
    }

    fn show_restaurant(
        &self,
        normalized: &str,
        grounded: &GroundedState,
    ) -> Option<FollowupOutcome> {
        let captures = SHOW_MORE_FROM.captures(normalized)?;
        let name_text = captures.get(1)?.as_str();
        let name_tokens = normalize(name_text);
        if name_tokens.is_empty() {
            return None;
        }
        for dish in &grounded.last_dishes {
            let known = normalize(&dish.restaurant_name);
            let matched = name_tokens
                .iter()
                .filter(|qt| known.iter().any(|kt| fuzzy_token_match(qt, kt)))
                .count();
            if matched > 0 {
                return Some(FollowupOutcome::ShowRestaurant {
                    restaurant_id: Some(dish.restaurant_id),
                    name: dish.restaurant_name.clone(),
                });
            }
        }
        Some(FollowupOutcome::ShowRestaurant {
            restaurant_id: None,
            name: name_text.trim().to_string(),
        })
    }

    fn attribute_question(
        &self,
        normalized: &str,
        grounded: &GroundedState,
    ) -> Option<FollowupOutcome> {
        let attribute = ATTRIBUTE_WORDS.find(normalized)?.as_str().to_string();
        // "hot" doubles as temperature; treat it as the spicy attribute
        let canonical = if attribute == "hot" { "spicy" } else { attribute.as_str() };

        let dish = match resolve_dish_reference(normalized, grounded) {
            DishReference::Named(dish) | DishReference::Implicit(dish) => dish,
            DishReference::Ambiguous(dishes) => {
                return Some(FollowupOutcome::Clarify {
                    candidates: dishes.iter().map(|d| d.name.clone()).collect(),
                })
            }
            DishReference::Mismatch => return Some(FollowupOutcome::NotHandled),
        };

        let haystack = normalize_text(&format!(
            "{} {}",
            dish.name,
            dish.description.as_deref().unwrap_or("")
        ));
        let verdict = ATTRIBUTE_EVIDENCE
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(_, evidence)| {
                if evidence.is_match(&haystack) {
                    AttributeVerdict::Yes
                } else if dish.description.is_some() {
                    AttributeVerdict::No
                } else {
                    AttributeVerdict::NoData
                }
            })
            .unwrap_or(AttributeVerdict::NoData);

        Some(FollowupOutcome::Attribute {
            dish: dish.name.clone(),
            attribute: canonical.to_string(),
            verdict,
        })
    }

    async fn tag_question(
        &self,
        normalized: &str,
        grounded: &GroundedState,
        store: &dyn DishStore,
    ) -> Option<FollowupOutcome> {
        let hard_tag = detect_hard_tags(normalized).into_iter().next();
        let allergen = normalize(normalized)
            .iter()
            .find_map(|t| {
                ALLERGEN_TERMS
                    .iter()
                    .find(|(term, _)| term == &t.as_str())
                    .map(|(_, slug)| slug.to_string())
            });
        let wants_list = ALLERGEN_LIST.is_match(normalized);
        if hard_tag.is_none() && allergen.is_none() && !wants_list {
            return None;
        }

        let dish = match resolve_dish_reference(normalized, grounded) {
            DishReference::Named(dish) | DishReference::Implicit(dish) => dish,
            DishReference::Ambiguous(dishes) => {
                return Some(FollowupOutcome::Clarify {
                    candidates: dishes.iter().map(|d| d.name.clone()).collect(),
                })
            }
            DishReference::Mismatch => return Some(FollowupOutcome::NotHandled),
        };

        // Always prefer fresh tag rows; the grounded copy is the fallback
        // when the store is unreachable.
        let slugs = match store.fetch_tags(&[dish.dish_id]).await {
            Ok(mut map) => map.remove(&dish.dish_id).unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "tag fetch failed, using grounded tags");
                dish.tag_slugs.clone()
            }
        };

        if wants_list {
            let allergens: Vec<String> = slugs
                .iter()
                .filter(|s| ALLERGEN_SLUGS.contains(&s.as_str()))
                .cloned()
                .collect();
            return Some(FollowupOutcome::AllergenList {
                dish: dish.name.clone(),
                allergens,
            });
        }

        let slug = hard_tag
            .map(|t| t.slug().to_string())
            .or(allergen)?;
        let present = slugs.iter().any(|s| s == &slug);
        Some(FollowupOutcome::TagAnswer {
            dish: dish.name.clone(),
            tag: slug,
            present,
        })
    }
}
