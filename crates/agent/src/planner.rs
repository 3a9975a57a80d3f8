//! Action planner: intent -> Plan
//!
//! Classification is deterministic by default: a fixed priority list over
//! the intent flags, so the same intent always plans the same action. A
//! completion-based classifier can be switched on per deployment; its
//! output is accepted only above a confidence floor and still passes
//! through the same guardrail chain, so the guardrails remain the
//! authority either way.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use dishcovery_core::{
    Action, ChatState, CompletionProvider, GroundedState, Intent, Plan, SearchParams,
};
use dishcovery_llm::{ActionDraft, PromptBuilder};
use dishcovery_text::normalize_text;

use crate::guardrails::{self, GuardrailContext};

/// Explicit "what is X" phrasing, the only form that keeps EXPLAIN
static WHAT_IS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(what is|what's|whats|what are|vad är|was ist|mikä on|kya hai|ki ha)\b")
        .expect("what-is pattern must compile")
});

pub(crate) fn is_what_is_question(normalized: &str) -> bool {
    WHAT_IS.is_match(normalized)
}

/// Build search parameters from an intent: the cleaned dish text plus
/// every tag-backed constraint as a required slug
pub(crate) fn search_params_from_intent(intent: &Intent) -> SearchParams {
    let mut tags = intent.hard_tag_slugs();
    for term in &intent.dietary {
        if !tags.contains(term) {
            tags.push(term.clone());
        }
    }
    SearchParams {
        query_text: intent.dish_query.clone(),
        tags,
        city: intent.city.clone(),
        budget_max_sek: intent.price_max,
    }
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Ask the completion model to classify instead of the rule list
    pub use_completion: bool,
    /// Completion classifications below this fall back to the rules
    pub min_confidence: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            use_completion: false,
            min_confidence: 0.7,
        }
    }
}

pub struct Planner {
    completion: Option<Arc<dyn CompletionProvider>>,
    prompts: PromptBuilder,
    config: PlannerConfig,
}

impl Planner {
    pub fn new() -> Self {
        Self {
            completion: None,
            prompts: PromptBuilder::new(),
            config: PlannerConfig::default(),
        }
    }

    pub fn with_completion(
        mut self,
        completion: Arc<dyn CompletionProvider>,
        config: PlannerConfig,
    ) -> Self {
        self.completion = Some(completion);
        self.config = config;
        self
    }

    /// Classify the turn and run the guardrail chain over the result
    pub async fn plan(
        &self,
        query: &str,
        intent: &Intent,
        grounded: &GroundedState,
        chat: &ChatState,
    ) -> Plan {
        let plan = match (&self.completion, self.config.use_completion) {
            (Some(completion), true) => {
                self.classify_with_completion(completion.as_ref(), query, intent, grounded, chat)
                    .await
            }
            _ => classify_deterministic(query, intent, grounded, chat),
        };
        debug!(action = ?plan.action, confidence = plan.confidence, "classified turn");
        let ctx = GuardrailContext {
            query,
            intent,
            grounded,
            chat,
        };
        guardrails::apply_chain(plan, &ctx)
    }

    async fn classify_with_completion(
        &self,
        completion: &dyn CompletionProvider,
        query: &str,
        intent: &Intent,
        grounded: &GroundedState,
        chat: &ChatState,
    ) -> Plan {
        let user = self.prompts.user_prompt(query, &[], chat);
        let draft = match completion
            .complete_structured(self.prompts.action_system_prompt(), &user)
            .await
        {
            Ok(value) => ActionDraft::from_value(value),
            Err(err) => {
                warn!(error = %err, "action classification call failed");
                None
            }
        };
        match draft.and_then(|d| plan_from_draft(d, intent, &self.config)) {
            Some(plan) => plan,
            None => classify_deterministic(query, intent, grounded, chat),
        }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_action(name: &str) -> Option<Action> {
    serde_json::from_value(serde_json::Value::String(name.trim().to_uppercase())).ok()
}

fn plan_from_draft(draft: ActionDraft, intent: &Intent, config: &PlannerConfig) -> Option<Plan> {
    let action = parse_action(&draft.action)?;
    if draft.confidence < config.min_confidence {
        debug!(
            confidence = draft.confidence,
            "completion classification below confidence floor"
        );
        return None;
    }
    let mut plan = Plan::new(action, draft.confidence);
    if action == Action::Search {
        let mut params = search_params_from_intent(intent);
        if params.query_text.is_none() {
            params.query_text = draft.query_text;
        }
        for tag in draft.tags {
            if !params.tags.contains(&tag) {
                params.tags.push(tag);
            }
        }
        plan.search = Some(params);
    }
    Some(plan)
}

/// Fixed priority list over the intent flags. First match wins.
fn classify_deterministic(
    query: &str,
    intent: &Intent,
    grounded: &GroundedState,
    _chat: &ChatState,
) -> Plan {
    let normalized = normalize_text(query);

    if intent.exit_restaurant {
        return Plan::new(Action::ExitRestaurant, 1.0);
    }
    if intent.show_menu {
        return Plan::new(Action::ShowMenu, 1.0);
    }
    if intent.is_restaurant_lookup {
        return Plan::new(Action::RestaurantLookup, 1.0);
    }
    if is_what_is_question(&normalized) && intent.dish_query.is_some() {
        return Plan::new(Action::Explain, 0.9);
    }
    if intent.is_followup && grounded.is_grounded() {
        return Plan::new(Action::Followup, 0.9);
    }
    if intent.dish_query.is_none() && (!intent.dietary.is_empty() || !intent.hard_tags.is_empty())
    {
        return Plan::new(Action::Search, 0.9).with_search(search_params_from_intent(intent));
    }
    if intent.is_vague && intent.has_no_constraints() {
        return Plan::new(Action::Clarify, 0.8);
    }
    Plan::new(Action::Search, 1.0).with_search(search_params_from_intent(intent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dishcovery_core::HardTag;

    async fn plan_default(query: &str, intent: &Intent) -> Plan {
        let grounded = GroundedState::default();
        let chat = ChatState::default();
        Planner::new().plan(query, intent, &grounded, &chat).await
    }

    #[tokio::test]
    async fn test_dish_query_plans_search_with_params() {
        let intent = Intent {
            dish_query: Some("veg pizza".to_string()),
            dietary: vec!["vegetarian".to_string()],
            hard_tags: vec![HardTag::Vegetarian],
            ..Default::default()
        };
        let plan = plan_default("veg pizza", &intent).await;
        assert_eq!(plan.action, Action::Search);
        let search = plan.search.expect("search params");
        assert_eq!(search.query_text.as_deref(), Some("veg pizza"));
        assert_eq!(search.tags, vec!["vegetarian".to_string()]);
    }

    #[tokio::test]
    async fn test_exit_beats_everything() {
        let intent = Intent {
            exit_restaurant: true,
            dish_query: Some("pizza".to_string()),
            ..Default::default()
        };
        let plan = plan_default("go back, actually pizza", &intent).await;
        assert_eq!(plan.action, Action::ExitRestaurant);
    }

    #[tokio::test]
    async fn test_what_is_plans_explain() {
        let intent = Intent {
            dish_query: Some("biryani".to_string()),
            ..Default::default()
        };
        let plan = plan_default("what is biryani", &intent).await;
        assert_eq!(plan.action, Action::Explain);
    }

    #[tokio::test]
    async fn test_vague_without_constraints_clarifies() {
        let intent = Intent {
            is_vague: true,
            ..Default::default()
        };
        let plan = plan_default("something good", &intent).await;
        assert_eq!(plan.action, Action::Clarify);
    }

    #[tokio::test]
    async fn test_tag_only_plans_search() {
        let intent = Intent {
            dietary: vec!["vegan".to_string()],
            hard_tags: vec![HardTag::Vegan],
            is_vague: true,
            ..Default::default()
        };
        let plan = plan_default("anything vegan", &intent).await;
        assert_eq!(plan.action, Action::Search);
        assert!(plan.search.expect("params").query_text.is_none());
    }

    #[test]
    fn test_parse_action_names() {
        assert_eq!(parse_action("SEARCH"), Some(Action::Search));
        assert_eq!(parse_action("restaurant_lookup"), Some(Action::RestaurantLookup));
        assert_eq!(parse_action("DANCE"), None);
    }
}
