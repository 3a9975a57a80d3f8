//! Intent extraction
//!
//! Turns one user utterance (plus a short history window) into a
//! structured `Intent`. A structured completion call produces a draft;
//! deterministic regex/dictionary post-processing then corrects the
//! things the completion is not trusted to get right: language from
//! script inspection, hard-tag detection with vegan-before-vegetarian
//! ordering, dietary validation against the current utterance only,
//! restaurant-name validation, the restaurant-lookup heuristic, and
//! menu-request handling. If the completion fails, a minimal fallback
//! intent keeps the turn alive.

pub mod extractor;
pub mod rules;

pub use extractor::IntentExtractor;
