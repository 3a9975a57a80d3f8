//! Per-session conversation state
//!
//! `ChatState` and `GroundedState` are plain values owned by the session
//! and passed explicitly into each turn; nothing here is globally shared,
//! so no locking discipline is required across sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::language::Language;

/// Session-scoped conversation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    /// Browsing across restaurants
    #[default]
    Discovery,
    /// Focused on a single restaurant; results are isolated to it
    Restaurant,
    /// Viewing a restaurant's profile page
    RestaurantProfile,
}

/// Session-scoped mode and focus state, mutated by the orchestrator after
/// each turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatState {
    pub mode: ChatMode,
    /// Focus scope when mode is Restaurant/RestaurantProfile
    pub current_restaurant_id: Option<Uuid>,
    /// Pagination cursor per restaurant, keyed by restaurant id
    pub pagination: HashMap<Uuid, usize>,
    /// Preferred response language
    pub preferred_language: Language,
}

impl ChatState {
    /// Enter restaurant focus, resetting that restaurant's cursor
    pub fn enter_restaurant(&mut self, restaurant_id: Uuid) {
        self.mode = ChatMode::Restaurant;
        self.current_restaurant_id = Some(restaurant_id);
        self.pagination.insert(restaurant_id, 0);
    }

    /// Leave restaurant focus back to discovery
    pub fn exit_restaurant(&mut self) {
        self.mode = ChatMode::Discovery;
        self.current_restaurant_id = None;
    }

    pub fn is_focused(&self) -> bool {
        matches!(self.mode, ChatMode::Restaurant | ChatMode::RestaurantProfile)
            && self.current_restaurant_id.is_some()
    }
}

/// One dish from the last shown result set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastResultDish {
    pub dish_id: Uuid,
    pub name: String,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
    /// Tag slugs attached to the dish in the tag table
    pub tag_slugs: Vec<String>,
    pub price_sek: Option<u32>,
    pub description: Option<String>,
}

/// Durable cross-turn memory of what was last shown
///
/// Updated only after a successful SEARCH/RESHOW turn; read (never
/// mutated) by the followup resolver and the anti-loop guardrail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundedState {
    pub last_dishes: Vec<LastResultDish>,
    pub last_query: Option<String>,
    pub last_dietary: Vec<String>,
    pub last_was_empty: bool,
}

impl GroundedState {
    /// Whether there is anything to ground a follow-up against
    pub fn is_grounded(&self) -> bool {
        !self.last_dishes.is_empty()
    }

    /// Distinct restaurant names across the grounded dishes
    pub fn restaurant_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for dish in &self.last_dishes {
            if !names.contains(&dish.restaurant_name.as_str()) {
                names.push(&dish.restaurant_name);
            }
        }
        names
    }
}

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One turn of conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_exit_restaurant() {
        let mut state = ChatState::default();
        let id = Uuid::new_v4();
        state.enter_restaurant(id);
        assert!(state.is_focused());
        assert_eq!(state.pagination.get(&id), Some(&0));
        state.exit_restaurant();
        assert_eq!(state.mode, ChatMode::Discovery);
        assert!(!state.is_focused());
    }

    #[test]
    fn test_grounded_restaurant_names_dedupe() {
        let rid = Uuid::new_v4();
        let dish = |name: &str| LastResultDish {
            dish_id: Uuid::new_v4(),
            name: name.to_string(),
            restaurant_id: rid,
            restaurant_name: "Indian Bites".to_string(),
            tag_slugs: vec![],
            price_sek: None,
            description: None,
        };
        let grounded = GroundedState {
            last_dishes: vec![dish("Dal"), dish("Naan")],
            ..Default::default()
        };
        assert_eq!(grounded.restaurant_names(), vec!["Indian Bites"]);
    }
}
