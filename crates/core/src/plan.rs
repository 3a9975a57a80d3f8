//! Plan: the action planner's decision for one turn
//!
//! Produced by classification (deterministic or completion-based), then
//! passed through the guardrail chain as a pure value. Guardrails return a
//! new plan rather than mutating in place; each triggered guardrail records
//! its name for observability and regression tests.

use serde::{Deserialize, Serialize};

/// The eight terminal actions a turn can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Search,
    Followup,
    Explain,
    Clarify,
    Reshow,
    ExitRestaurant,
    ShowMenu,
    RestaurantLookup,
}

/// Search parameters attached to SEARCH plans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Dish text to search for; None means tag-only search
    pub query_text: Option<String>,
    /// Tag slugs that must all be present on returned dishes
    pub tags: Vec<String>,
    /// City filter
    pub city: Option<String>,
    /// Price ceiling in SEK
    pub budget_max_sek: Option<u32>,
}

/// Durable preference changes extracted from the turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefsPatch {
    pub dietary: Vec<String>,
    pub city: Option<String>,
    pub budget_max_sek: Option<u32>,
}

/// The planner's decision, finalized after the guardrail chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub action: Action,
    pub confidence: f32,
    pub search: Option<SearchParams>,
    pub prefs_patch: Option<PrefsPatch>,
    /// Names of guardrails that changed this plan, in trigger order.
    /// In-process observability only, stays out of the wire shape.
    #[serde(skip)]
    pub guardrails: Vec<&'static str>,
}

impl Plan {
    pub fn new(action: Action, confidence: f32) -> Self {
        Self {
            action,
            confidence,
            search: None,
            prefs_patch: None,
            guardrails: Vec::new(),
        }
    }

    pub fn with_search(mut self, search: SearchParams) -> Self {
        self.search = Some(search);
        self
    }

    /// Record a triggered guardrail, keeping the list duplicate-free so the
    /// chain stays idempotent when re-applied.
    pub fn record_guardrail(mut self, name: &'static str) -> Self {
        if !self.guardrails.contains(&name) {
            self.guardrails.push(name);
        }
        self
    }
}
