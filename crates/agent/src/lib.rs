//! Action planning and turn orchestration.
//!
//! Given an extracted [`dishcovery_core::Intent`], the [`Planner`] decides
//! which action to take, a chain of [`guardrails`] corrects common
//! misclassifications, the [`FollowupResolver`] answers questions about
//! dishes already on screen, and the [`TurnEngine`] wires everything into a
//! single `handle_turn` entry point.

pub mod followup;
pub mod guardrails;
pub mod planner;
pub mod session;

pub use followup::{AttributeVerdict, FollowupOutcome, FollowupResolver};
pub use guardrails::GuardrailContext;
pub use planner::{Planner, PlannerConfig};
pub use session::{Session, TurnEngine, TurnOutcome};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("planning error: {0}")]
    Planning(String),

    #[error("retrieval error: {0}")]
    Retrieval(#[from] dishcovery_retrieval::RetrievalError),

    #[error("llm error: {0}")]
    Llm(#[from] dishcovery_llm::LlmError),

    #[error("core error: {0}")]
    Core(#[from] dishcovery_core::Error),
}

impl From<AgentError> for dishcovery_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Core(e) => e,
            AgentError::Retrieval(e) => e.into(),
            AgentError::Llm(e) => e.into(),
            AgentError::Planning(msg) => dishcovery_core::Error::Planning(msg),
        }
    }
}
