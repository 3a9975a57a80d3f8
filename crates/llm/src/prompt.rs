//! Prompt construction for the structured completion calls
//!
//! Fixed instruction prompts with few-shot examples. The schemas here
//! mirror `schema::IntentDraft` and `schema::ActionDraft`; deterministic
//! post-processing downstream corrects whatever the completion gets wrong,
//! so the prompts aim for recall over precision.

use dishcovery_core::{ChatState, Turn, TurnRole};

const INTENT_SYSTEM_PROMPT: &str = r#"You extract structured food-search intent from one user message.
Return ONLY a JSON object with these fields:
  dish_query: string|null      - the dish the user wants, cleaned of filler; null if none
  city: string|null            - city constraint if mentioned
  dietary: string[]            - dietary terms mentioned IN THIS MESSAGE only
  allergy: string[]            - allergy terms mentioned in this message
  ingredients: string[]        - ingredient constraints ("with paneer", "no onion")
  price_max: number|null       - price ceiling in SEK if mentioned
  language: string             - ISO 639-1 code of the message language
  is_vague: boolean            - true only when no dish and no constraint is given
  is_followup: boolean         - true when the message refers to previously shown results
  is_restaurant_lookup: boolean - true when the message is just a restaurant name
  restaurant_name: string|null - restaurant name if one appears in the message
  show_menu: boolean           - true for explicit full-menu requests
  exit_restaurant: boolean     - true when the user wants to leave the current restaurant
  cuisine: string|null         - cuisine hint if mentioned

Never carry dietary terms over from earlier messages. Do not invent restaurant names.

Examples:
User: "veg pizza in Malmö"
{"dish_query":"pizza","city":"Malmö","dietary":["vegetarian"],"allergy":[],"ingredients":[],"price_max":null,"language":"en","is_vague":false,"is_followup":false,"is_restaurant_lookup":false,"restaurant_name":null,"show_menu":false,"exit_restaurant":false,"cuisine":null}

User: "is it halal?"
{"dish_query":null,"city":null,"dietary":["halal"],"allergy":[],"ingredients":[],"price_max":null,"language":"en","is_vague":false,"is_followup":true,"is_restaurant_lookup":false,"restaurant_name":null,"show_menu":false,"exit_restaurant":false,"cuisine":null}

User: "Indian Bites"
{"dish_query":null,"city":null,"dietary":[],"allergy":[],"ingredients":[],"price_max":null,"language":"en","is_vague":false,"is_followup":false,"is_restaurant_lookup":true,"restaurant_name":"Indian Bites","show_menu":false,"exit_restaurant":false,"cuisine":null}

User: "show me the full menu"
{"dish_query":null,"city":null,"dietary":[],"allergy":[],"ingredients":[],"price_max":null,"language":"en","is_vague":false,"is_followup":false,"is_restaurant_lookup":false,"restaurant_name":null,"show_menu":true,"exit_restaurant":false,"cuisine":null}

User: "something tasty"
{"dish_query":null,"city":null,"dietary":[],"allergy":[],"ingredients":[],"price_max":null,"language":"en","is_vague":true,"is_followup":false,"is_restaurant_lookup":false,"restaurant_name":null,"show_menu":false,"exit_restaurant":false,"cuisine":null}"#;

const ACTION_SYSTEM_PROMPT: &str = r#"You classify one food-search turn into exactly one action.
Return ONLY a JSON object: {"action": <ACTION>, "confidence": <0..1>, "query_text": string|null, "tags": string[]}
ACTION is one of: SEARCH, FOLLOWUP, EXPLAIN, CLARIFY, RESHOW, EXIT_RESTAURANT, SHOW_MENU, RESTAURANT_LOOKUP.

EXPLAIN is only for explicit "what is X" phrasing. Questions about diet or
allergens are never EXPLAIN. A bare restaurant name is RESTAURANT_LOOKUP."#;

/// Maximum history turns included in a user prompt
const MAX_HISTORY_TURNS: usize = 6;

/// Builder for the intent-extraction and action-classification prompts
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn intent_system_prompt(&self) -> &'static str {
        INTENT_SYSTEM_PROMPT
    }

    pub fn action_system_prompt(&self) -> &'static str {
        ACTION_SYSTEM_PROMPT
    }

    /// Render the user prompt: short history window, focus context, query
    pub fn user_prompt(&self, query: &str, history: &[Turn], chat_state: &ChatState) -> String {
        let mut prompt = String::new();

        if !history.is_empty() {
            prompt.push_str("Conversation so far:\n");
            let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
            for turn in &history[start..] {
                let role = match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Assistant => "assistant",
                };
                prompt.push_str(&format!("{}: {}\n", role, turn.text));
            }
            prompt.push('\n');
        }

        if chat_state.is_focused() {
            prompt.push_str("The user is currently browsing a single restaurant.\n\n");
        }

        prompt.push_str(&format!("User message: {}", query));
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dishcovery_core::ChatState;
    use uuid::Uuid;

    #[test]
    fn test_user_prompt_includes_history_window() {
        let history: Vec<Turn> = (0..10).map(|i| Turn::user(format!("turn {}", i))).collect();
        let prompt = PromptBuilder::new().user_prompt("pizza", &history, &ChatState::default());
        assert!(!prompt.contains("turn 0"));
        assert!(prompt.contains("turn 9"));
        assert!(prompt.ends_with("User message: pizza"));
    }

    #[test]
    fn test_focus_context_mentioned() {
        let mut state = ChatState::default();
        state.enter_restaurant(Uuid::new_v4());
        let prompt = PromptBuilder::new().user_prompt("pizza", &[], &state);
        assert!(prompt.contains("single restaurant"));
    }
}
