//! Filler-word stripping
//!
//! Dish queries arrive wrapped in conversational filler ("I want some",
//! "something with", "tack"). Stripping it leaves the tokens that actually
//! constrain retrieval; when nothing meaningful remains the caller treats
//! the query as tag-only.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::dietary::strip_dietary_terms;
use crate::normalize::normalize;

static FILLER_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // English
        "i", "me", "my", "we", "a", "an", "the", "some", "something", "anything", "any", "want",
        "wants", "would", "like", "love", "need", "craving", "crave", "please", "can", "could",
        "get", "give", "show", "find", "eat", "have", "food", "dish", "dishes", "meal",
        "hungry", "really", "good", "best", "nice", "today", "tonight", "now", "for", "to", "of",
        "with", "and", "or", "in", "on", "at", "near", "nearby", "around", "is", "are", "do",
        "does", "what", "which", "where", "there", "here", "order",
        // Swedish
        "jag", "vill", "ha", "något", "någon", "mat", "tack", "en", "ett", "och", "eller", "nära",
        // German
        "ich", "möchte", "etwas", "essen", "bitte", "und", "oder",
        // Danish/Norwegian
        "jeg", "noget", "noe", "takk",
        // Finnish
        "haluan", "jotain", "ruokaa", "kiitos",
        // Romanized Hindi fillers
        "mujhe", "chahiye", "kuch", "khana", "hai", "kya",
    ]
    .into_iter()
    .collect()
});

/// Remove filler words from a token list
pub fn strip_filler(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !FILLER_WORDS.contains(t.as_str()))
        .cloned()
        .collect()
}

/// Tokens of a raw query that remain after normalization, dietary-keyword
/// stripping and filler removal. These are the tokens the token-precision
/// filter requires to appear in a dish's name/description/section.
pub fn leftover_tokens(raw_query: &str) -> Vec<String> {
    let stripped = strip_dietary_terms(&crate::normalize::normalize_text(raw_query));
    strip_filler(&normalize(&stripped))
}

/// Tokens of at least three characters, used for literal-presence checks
/// (restaurant-name validation, exact-match boost)
pub fn significant_tokens(text: &str) -> Vec<String> {
    normalize(text)
        .into_iter()
        .filter(|t| t.chars().count() >= 3)
        .collect()
}
