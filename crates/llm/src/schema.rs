//! Serde schemas for completion drafts
//!
//! Every field is optional and unknown fields are ignored: the completion
//! is never trusted to produce a perfect shape, and a partially parsed
//! draft is still worth post-processing. A draft that fails to parse at
//! all is treated like a service failure by the caller.

use serde::Deserialize;

/// Draft intent extraction returned by the completion service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentDraft {
    #[serde(default)]
    pub dish_query: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub dietary: Vec<String>,
    #[serde(default)]
    pub allergy: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub price_max: Option<u32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub is_vague: bool,
    #[serde(default)]
    pub is_followup: bool,
    #[serde(default)]
    pub is_restaurant_lookup: bool,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub show_menu: bool,
    #[serde(default)]
    pub exit_restaurant: bool,
    #[serde(default)]
    pub cuisine: Option<String>,
}

impl IntentDraft {
    /// Parse a completion payload, tolerating partial shapes
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

/// Draft action classification returned by the completion service
#[derive(Debug, Clone, Deserialize)]
pub struct ActionDraft {
    pub action: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub query_text: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ActionDraft {
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_draft_parses() {
        let draft = IntentDraft::from_value(json!({
            "dish_query": "pizza",
            "unknown_field": 42
        }))
        .unwrap();
        assert_eq!(draft.dish_query.as_deref(), Some("pizza"));
        assert!(draft.dietary.is_empty());
    }

    #[test]
    fn test_garbage_draft_rejected() {
        assert!(IntentDraft::from_value(json!("not an object")).is_none());
    }

    #[test]
    fn test_action_draft_defaults() {
        let draft = ActionDraft::from_value(json!({"action": "SEARCH"})).unwrap();
        assert_eq!(draft.action, "SEARCH");
        assert_eq!(draft.confidence, 0.0);
    }
}
