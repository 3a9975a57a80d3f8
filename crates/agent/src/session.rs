//! Turn engine: one entry point per user turn
//!
//! Owns the full pipeline order: grounded followup resolution first, then
//! intent extraction, planning with guardrails, action dispatch, and
//! finally result shaping plus state bookkeeping. A turn never returns an
//! error to the caller; every failure path degrades into a renderable
//! outcome.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use dishcovery_core::{
    Action, ChatState, CompletionProvider, DishStore, EmbeddingProvider, GroundedState, HardTag,
    HybridCandidate, Intent, LastResultDish, SearchParams, Turn,
};
use dishcovery_intent::IntentExtractor;
use dishcovery_retrieval::{
    finalize_results, EngineConfig, HybridSearchEngine, MatchCriteria, ShapedResults, ShaperConfig,
};

use crate::followup::{FollowupOutcome, FollowupResolver};
use crate::planner::{search_params_from_intent, Planner};

const MAX_HISTORY_TURNS: usize = 20;

/// Everything needed to re-shape the last result set without re-querying
#[derive(Debug, Clone)]
struct SearchSnapshot {
    candidates: Vec<HybridCandidate>,
    tags: HashMap<Uuid, Vec<String>>,
    criteria: MatchCriteria,
    shaped: ShapedResults,
}

/// One user's conversation: chat state, grounded results and history
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub chat: ChatState,
    pub grounded: GroundedState,
    pub history: Vec<Turn>,
    last_search: Option<SearchSnapshot>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            chat: ChatState::default(),
            grounded: GroundedState::default(),
            history: Vec::new(),
            last_search: None,
        }
    }

    fn push_turn(&mut self, turn: Turn) {
        self.history.push(turn);
        if self.history.len() > MAX_HISTORY_TURNS {
            let excess = self.history.len() - MAX_HISTORY_TURNS;
            self.history.drain(..excess);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// What one turn resolved to, ready for rendering
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Shaped restaurant cards plus the retrieval paths that produced them
    Results {
        results: ShapedResults,
        trace: Vec<&'static str>,
    },
    /// The search ran and nothing survived
    NoMatches { query: Option<String> },
    /// Ask the user to narrow down; candidates list the ambiguous dishes
    Clarify { candidates: Vec<String> },
    /// A grounded followup answer (translation, attribute, tag, allergens)
    Followup(FollowupOutcome),
    /// Describe a dish from general knowledge
    Explain { subject: String },
    /// Render the focused restaurant's full menu
    Menu { restaurant_id: Uuid },
    /// Entered restaurant focus
    FocusEntered {
        restaurant_id: Uuid,
        name: String,
    },
    /// Left restaurant focus back to discovery
    FocusExited,
    /// A restaurant was asked for by name but couldn't be resolved
    RestaurantUnresolved { name: String },
}

pub struct TurnEngine {
    extractor: IntentExtractor,
    planner: Planner,
    resolver: FollowupResolver,
    engine: HybridSearchEngine,
    store: Arc<dyn DishStore>,
    shaper: ShaperConfig,
}

impl TurnEngine {
    pub fn new(
        store: Arc<dyn DishStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        completion: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            extractor: IntentExtractor::new(completion),
            planner: Planner::new(),
            resolver: FollowupResolver::new(),
            engine: HybridSearchEngine::new(store.clone(), embedder, EngineConfig::default()),
            store,
            shaper: ShaperConfig::default(),
        }
    }

    /// Replace the retrieval engine, e.g. to attach a translator
    pub fn with_engine(mut self, engine: HybridSearchEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_planner(mut self, planner: Planner) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_shaper_config(mut self, shaper: ShaperConfig) -> Self {
        self.shaper = shaper;
        self
    }

    /// Process one user turn end to end
    pub async fn handle_turn(&self, session: &mut Session, text: &str) -> TurnOutcome {
        session.push_turn(Turn::user(text));

        // Grounded followups short-circuit the planner entirely.
        if session.grounded.is_grounded() {
            match self
                .resolver
                .resolve(text, &session.grounded, self.store.as_ref())
                .await
            {
                FollowupOutcome::NotHandled => {}
                FollowupOutcome::Paginate => {
                    let outcome = self.reshow(session, true);
                    return self.finish(session, outcome);
                }
                FollowupOutcome::ShowRestaurant {
                    restaurant_id,
                    name,
                } => {
                    let outcome = self.open_restaurant(session, restaurant_id, &name).await;
                    return self.finish(session, outcome);
                }
                answered => {
                    return self.finish(session, TurnOutcome::Followup(answered));
                }
            }
        }

        let intent = self
            .extractor
            .extract(text, &session.history, &session.chat)
            .await;
        let plan = self
            .planner
            .plan(text, &intent, &session.grounded, &session.chat)
            .await;
        debug!(action = ?plan.action, guardrails = ?plan.guardrails, "dispatching plan");

        let outcome = match plan.action {
            Action::ExitRestaurant => {
                session.chat.exit_restaurant();
                TurnOutcome::FocusExited
            }
            Action::ShowMenu => self.show_menu(session, &intent).await,
            Action::RestaurantLookup => {
                let name = intent
                    .restaurant_name
                    .clone()
                    .unwrap_or_else(|| text.trim().to_string());
                self.open_restaurant(session, None, &name).await
            }
            Action::Clarify => TurnOutcome::Clarify { candidates: vec![] },
            Action::Explain => TurnOutcome::Explain {
                subject: intent
                    .dish_query
                    .clone()
                    .unwrap_or_else(|| text.trim().to_string()),
            },
            Action::Reshow => self.reshow(session, false),
            Action::Search | Action::Followup => {
                let params = plan
                    .search
                    .unwrap_or_else(|| search_params_from_intent(&intent));
                self.search(session, text, &intent, params).await
            }
        };
        self.finish(session, outcome)
    }

    fn finish(&self, session: &mut Session, outcome: TurnOutcome) -> TurnOutcome {
        session.push_turn(Turn::assistant(describe(&outcome)));
        outcome
    }

    async fn show_menu(&self, session: &mut Session, intent: &Intent) -> TurnOutcome {
        if let Some(restaurant_id) = session.chat.current_restaurant_id {
            return TurnOutcome::Menu { restaurant_id };
        }
        if let Some(name) = intent.restaurant_name.clone() {
            return match self.open_restaurant(session, None, &name).await {
                TurnOutcome::FocusEntered { restaurant_id, .. } => {
                    TurnOutcome::Menu { restaurant_id }
                }
                other => other,
            };
        }
        TurnOutcome::Clarify { candidates: vec![] }
    }

    async fn open_restaurant(
        &self,
        session: &mut Session,
        restaurant_id: Option<Uuid>,
        name: &str,
    ) -> TurnOutcome {
        if let Some(id) = restaurant_id {
            session.chat.enter_restaurant(id);
            return TurnOutcome::FocusEntered {
                restaurant_id: id,
                name: name.to_string(),
            };
        }
        match self.store.lookup_restaurant_by_name(name).await {
            Ok(candidates) if !candidates.is_empty() => {
                let best = &candidates[0];
                session.chat.enter_restaurant(best.restaurant_id);
                TurnOutcome::FocusEntered {
                    restaurant_id: best.restaurant_id,
                    name: best.name.clone(),
                }
            }
            Ok(_) => TurnOutcome::RestaurantUnresolved {
                name: name.to_string(),
            },
            Err(err) => {
                warn!(error = %err, "restaurant lookup failed");
                TurnOutcome::RestaurantUnresolved {
                    name: name.to_string(),
                }
            }
        }
    }

    /// Re-present the last results. With `advance` the stored cursors
    /// point at the next page; without it the stored shaping is returned
    /// as-is.
    fn reshow(&self, session: &mut Session, advance: bool) -> TurnOutcome {
        let Some(snapshot) = session.last_search.clone() else {
            return TurnOutcome::NoMatches {
                query: session.grounded.last_query.clone(),
            };
        };
        if !advance {
            return TurnOutcome::Results {
                results: snapshot.shaped,
                trace: vec!["reshow"],
            };
        }
        let shaped = finalize_results(
            &snapshot.candidates,
            &snapshot.tags,
            &snapshot.criteria,
            &session.chat,
            &self.shaper,
        );
        if shaped.cards.is_empty() {
            return TurnOutcome::NoMatches {
                query: session.grounded.last_query.clone(),
            };
        }
        self.remember(session, None, None, &shaped);
        session.last_search = Some(SearchSnapshot {
            candidates: snapshot.candidates,
            tags: snapshot.tags,
            criteria: snapshot.criteria,
            shaped: shaped.clone(),
        });
        TurnOutcome::Results {
            results: shaped,
            trace: vec!["paginate"],
        }
    }

    async fn search(
        &self,
        session: &mut Session,
        text: &str,
        intent: &Intent,
        params: SearchParams,
    ) -> TurnOutcome {
        let outcome = self.engine.run(&params, intent.language).await;
        let dish_ids: Vec<Uuid> = outcome.candidates.iter().map(|c| c.dish_id).collect();
        let tags = match self.store.fetch_tags(&dish_ids).await {
            Ok(map) => map,
            Err(err) => {
                warn!(error = %err, "tag fetch failed, strict constraints see no evidence");
                HashMap::new()
            }
        };

        let criteria = MatchCriteria {
            dish_query: params.query_text.clone(),
            strict_vegan: intent.hard_tags.contains(&HardTag::Vegan),
            dietary_active: !intent.dietary.is_empty() || !params.tags.is_empty(),
        };

        // Fresh search restarts pagination.
        session.chat.pagination.clear();
        let shaped = finalize_results(
            &outcome.candidates,
            &tags,
            &criteria,
            &session.chat,
            &self.shaper,
        );

        if shaped.cards.is_empty() {
            // The grounded view moves as one unit; keeping prior dishes
            // under the failed query would let followups answer about
            // results the user no longer sees.
            session.grounded = GroundedState {
                last_dishes: Vec::new(),
                last_query: Some(text.to_string()),
                last_dietary: intent.dietary.clone(),
                last_was_empty: true,
            };
            session.last_search = None;
            return TurnOutcome::NoMatches {
                query: params.query_text.clone(),
            };
        }

        self.remember(session, Some(text), Some(&intent.dietary), &shaped);
        session.last_search = Some(SearchSnapshot {
            candidates: outcome.candidates,
            tags,
            criteria,
            shaped: shaped.clone(),
        });
        TurnOutcome::Results {
            results: shaped,
            trace: outcome.trace,
        }
    }

    /// Update grounded state and pagination cursors from a shaping
    fn remember(
        &self,
        session: &mut Session,
        query: Option<&str>,
        dietary: Option<&Vec<String>>,
        shaped: &ShapedResults,
    ) {
        let mut dishes = Vec::new();
        for card in &shaped.cards {
            for dish in &card.dishes {
                dishes.push(LastResultDish {
                    dish_id: dish.dish_id,
                    name: dish.name.clone(),
                    restaurant_id: card.restaurant_id,
                    restaurant_name: card.name.clone(),
                    tag_slugs: dish.tag_slugs.clone(),
                    price_sek: dish.price_sek,
                    description: dish.description.clone(),
                });
            }
            match card.next_offset {
                Some(next) => {
                    session.chat.pagination.insert(card.restaurant_id, next);
                }
                None => {
                    session.chat.pagination.remove(&card.restaurant_id);
                }
            }
        }
        session.grounded.last_dishes = dishes;
        if let Some(query) = query {
            session.grounded.last_query = Some(query.to_string());
        }
        if let Some(dietary) = dietary {
            session.grounded.last_dietary = dietary.clone();
        }
        session.grounded.last_was_empty = false;
    }
}

fn describe(outcome: &TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Results { results, .. } => format!(
            "showed {} dishes across {} restaurants",
            results.truncation.total_returned,
            results.cards.len()
        ),
        TurnOutcome::NoMatches { .. } => "no matches found".to_string(),
        TurnOutcome::Clarify { .. } => "asked for clarification".to_string(),
        TurnOutcome::Followup(_) => "answered a followup".to_string(),
        TurnOutcome::Explain { subject } => format!("explained {subject}"),
        TurnOutcome::Menu { .. } => "showed the menu".to_string(),
        TurnOutcome::FocusEntered { name, .. } => format!("opened {name}"),
        TurnOutcome::FocusExited => "left the restaurant".to_string(),
        TurnOutcome::RestaurantUnresolved { name } => {
            format!("could not find {name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_stays_bounded() {
        let mut session = Session::new();
        for i in 0..(MAX_HISTORY_TURNS + 10) {
            session.push_turn(Turn::user(format!("turn {i}")));
        }
        assert_eq!(session.history.len(), MAX_HISTORY_TURNS);
        assert_eq!(session.history[0].text, "turn 10");
    }
}
