//! Text normalization and multilingual keyword rules
//!
//! Leaf utilities used by every other pipeline crate:
//! - **Normalization**: lowercasing, punctuation/emoji stripping with
//!   Unicode letters preserved, whitespace collapse
//! - **Script detection**: code-point range inspection for Devanagari,
//!   Gurmukhi, Arabic and Cyrillic, plus romanized-phrase detection for
//!   scripts typed phonetically
//! - **Fuzzy token similarity**: spelling-variant tolerant matching used
//!   for dish names and restaurant lookup
//! - **Dietary rules**: one ordered, named rule table canonicalizing
//!   dietary keywords across English, Swedish, German, Finnish and
//!   Danish/Norwegian

pub mod dietary;
pub mod filler;
pub mod fuzzy;
pub mod normalize;
pub mod script;
pub mod vocab;

pub use dietary::{
    canonicalize_dietary, detect_dietary, detect_hard_tags, mentions_dietary, strip_dietary_terms,
    DietaryRule, DIETARY_RULES,
};
pub use filler::{leftover_tokens, significant_tokens, strip_filler};
pub use fuzzy::{fuzzy_token_match, positional_ratio};
pub use normalize::{normalize, normalize_text};
pub use script::{detect_romanized_language, detect_script_language, ScriptDetector};
pub use vocab::{mentions_dish_name, COMMON_DISH_NAMES};
