//! Intent extractor
//!
//! Completion draft + deterministic overrides. The override order
//! matters: language first (script beats model), then dietary detection
//! and validation, then the lookup heuristic and menu handling, then
//! dish-query cleanup, and finally invariant enforcement.

use std::sync::Arc;

use dishcovery_core::{ChatState, CompletionProvider, HardTag, Intent, Language, Turn};
use dishcovery_llm::{IntentDraft, PromptBuilder};
use dishcovery_text::{
    canonicalize_dietary, detect_dietary, detect_romanized_language, detect_script_language,
    mentions_dietary, normalize_text, significant_tokens,
};

use crate::rules;

/// Intent extractor combining a structured completion with deterministic
/// post-processing
pub struct IntentExtractor {
    completion: Arc<dyn CompletionProvider>,
    prompts: PromptBuilder,
}

impl IntentExtractor {
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self {
            completion,
            prompts: PromptBuilder::new(),
        }
    }

    /// Extract a structured intent for one utterance
    ///
    /// Never fails a turn: a completion error or unparseable payload
    /// degrades to a minimal intent built from the raw query and the
    /// deterministic lookup heuristic.
    pub async fn extract(&self, query: &str, history: &[Turn], chat_state: &ChatState) -> Intent {
        let lookup_flag = rules::is_restaurant_lookup(query);

        let draft = match self
            .completion
            .complete_structured(
                self.prompts.intent_system_prompt(),
                &self.prompts.user_prompt(query, history, chat_state),
            )
            .await
        {
            Ok(value) => IntentDraft::from_value(value),
            Err(err) => {
                tracing::warn!(reason = "intent_completion_failed", error = %err, "using fallback intent");
                None
            }
        };

        let Some(draft) = draft else {
            return Intent::fallback(query, lookup_flag).enforce_invariants();
        };

        self.merge(query, chat_state, lookup_flag, draft)
    }

    /// Apply the deterministic overrides on top of the draft
    fn merge(
        &self,
        query: &str,
        chat_state: &ChatState,
        lookup_flag: bool,
        draft: IntentDraft,
    ) -> Intent {
        let normalized = normalize_text(query);

        // Script and romanization detection always win over the draft's
        // language guess.
        let language = detect_script_language(query)
            .or_else(|| detect_romanized_language(&normalized))
            .unwrap_or_else(|| {
                draft
                    .language
                    .as_deref()
                    .map(Language::from_code)
                    .unwrap_or_default()
            });

        // Dietary terms: whatever the raw utterance yields, plus any
        // draft term that canonicalizes AND literally occurs in the
        // current utterance. History carry-over dies here.
        let mut dietary = detect_dietary(&normalized);
        for term in &draft.dietary {
            if let Some(canonical) = canonicalize_dietary(term) {
                if mentions_dietary(&normalized, canonical)
                    && !dietary.contains(&canonical.to_string())
                {
                    dietary.push(canonical.to_string());
                }
            }
        }

        // Hard tags from the validated dietary set; the rule table's
        // vegan-before-vegetarian order carries through.
        let hard_tags: Vec<HardTag> = dietary
            .iter()
            .filter_map(|term| HardTag::from_slug(term))
            .collect();

        // Allergy terms survive only when literally present.
        let allergy: Vec<String> = draft
            .allergy
            .iter()
            .filter(|term| normalized.contains(&normalize_text(term)))
            .cloned()
            .collect();

        // Restaurant name: at least one significant word must literally
        // appear in the query, otherwise the name is a hallucinated
        // carry-over and is nulled.
        let restaurant_name = draft.restaurant_name.as_deref().and_then(|name| {
            let words = significant_tokens(name);
            if !words.is_empty() && words.iter().any(|w| normalized.contains(w.as_str())) {
                Some(name.to_string())
            } else {
                tracing::debug!(reason = "restaurant_name_unvalidated", name, "dropping draft name");
                None
            }
        });

        let is_restaurant_lookup = lookup_flag
            || (draft.is_restaurant_lookup
                && restaurant_name.is_some()
                && !rules::has_food_intent(&normalized));

        // Menu requests force the dish query to null so the literal
        // request text never leaks into search.
        let show_menu =
            draft.show_menu || rules::is_menu_request(&normalized, chat_state.is_focused());

        let dish_query = if show_menu || is_restaurant_lookup {
            None
        } else {
            draft
                .dish_query
                .as_deref()
                .and_then(rules::clean_dish_query)
                .or_else(|| {
                    if draft.is_followup || draft.is_vague {
                        None
                    } else {
                        rules::clean_dish_query(query)
                    }
                })
        };

        let exit_restaurant = draft.exit_restaurant || rules::is_exit_phrase(&normalized);
        let is_followup = draft.is_followup || rules::is_followup_phrase(&normalized);

        Intent {
            dish_query,
            city: draft.city,
            dietary,
            allergy,
            ingredients: draft.ingredients,
            hard_tags,
            price_max: draft.price_max,
            language,
            is_vague: draft.is_vague,
            is_followup,
            is_restaurant_lookup,
            restaurant_name: restaurant_name.or_else(|| {
                if lookup_flag {
                    Some(query.trim().to_string())
                } else {
                    None
                }
            }),
            show_menu,
            exit_restaurant,
            cuisine: draft.cuisine,
        }
        .enforce_invariants()
    }
}
