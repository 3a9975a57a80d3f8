//! Language definitions
//!
//! Languages the pipeline recognizes either by script inspection or by
//! dietary-keyword dictionaries. Script-detected languages always win over
//! model-guessed ones further up the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported languages, identified by ISO 639-1 code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(alias = "english")]
    En,
    /// Swedish
    #[serde(alias = "swedish")]
    Sv,
    /// German
    #[serde(alias = "german")]
    De,
    /// Finnish
    #[serde(alias = "finnish")]
    Fi,
    /// Danish
    #[serde(alias = "danish")]
    Da,
    /// Norwegian
    #[serde(alias = "norwegian")]
    No,
    /// Hindi (Devanagari or romanized)
    #[serde(alias = "hindi")]
    Hi,
    /// Punjabi (Gurmukhi or romanized)
    #[serde(alias = "punjabi")]
    Pa,
    /// Urdu (Arabic script)
    #[serde(alias = "urdu")]
    Ur,
    /// Russian (Cyrillic script)
    #[serde(alias = "russian")]
    Ru,
}

impl Language {
    /// ISO 639-1 code for this language
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Sv => "sv",
            Language::De => "de",
            Language::Fi => "fi",
            Language::Da => "da",
            Language::No => "no",
            Language::Hi => "hi",
            Language::Pa => "pa",
            Language::Ur => "ur",
            Language::Ru => "ru",
        }
    }

    /// Parse an ISO 639-1 code, defaulting to English for unknown codes
    pub fn from_code(code: &str) -> Self {
        match code.to_lowercase().as_str() {
            "sv" => Language::Sv,
            "de" => Language::De,
            "fi" => Language::Fi,
            "da" => Language::Da,
            "no" | "nb" | "nn" => Language::No,
            "hi" => Language::Hi,
            "pa" => Language::Pa,
            "ur" => Language::Ur,
            "ru" => Language::Ru,
            _ => Language::En,
        }
    }

    /// Whether the language is typically written in a non-Latin script
    pub fn non_latin_script(&self) -> bool {
        matches!(
            self,
            Language::Hi | Language::Pa | Language::Ur | Language::Ru
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for lang in [
            Language::En,
            Language::Sv,
            Language::De,
            Language::Fi,
            Language::Da,
            Language::No,
            Language::Hi,
            Language::Pa,
            Language::Ur,
            Language::Ru,
        ] {
            assert_eq!(Language::from_code(lang.code()), lang);
        }
    }

    #[test]
    fn test_unknown_code_defaults_to_english() {
        assert_eq!(Language::from_code("xx"), Language::En);
    }
}
