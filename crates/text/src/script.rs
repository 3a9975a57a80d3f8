//! Script and romanized-phrase detection
//!
//! Code-point range inspection is more reliable than model-based language
//! guessing for short queries, so the extractor always lets a script hit
//! override the completion's language field. Romanized phrase detection
//! catches non-English interrogatives typed phonetically in Latin script
//! ("kya hai", "ki ha").

use dishcovery_core::Language;

/// Minimum share of letters that must belong to a script before the query
/// is assigned that script's language. Keeps mixed queries with a stray
/// character from flipping language.
const SCRIPT_SHARE_THRESHOLD: f32 = 0.3;

/// Known Latin-script transliterations of non-English interrogatives and
/// fillers, with the language they indicate.
const ROMANIZED_PHRASES: &[(&str, Language)] = &[
    ("kya hai", Language::Hi),
    ("kya h", Language::Hi),
    ("kya milega", Language::Hi),
    ("kaunsa", Language::Hi),
    ("kaun sa", Language::Hi),
    ("kitna", Language::Hi),
    ("kaise", Language::Hi),
    ("chahiye", Language::Hi),
    ("dikhao", Language::Hi),
    ("batao", Language::Hi),
    ("ki ha", Language::Pa),
    ("ki hai", Language::Pa),
    ("kinna", Language::Pa),
    ("dasso", Language::Pa),
];

/// Script detector over Unicode code-point ranges
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect a language from the dominant non-Latin script, if any
    pub fn detect(&self, text: &str) -> Option<Language> {
        let mut letters = 0usize;
        let mut devanagari = 0usize;
        let mut gurmukhi = 0usize;
        let mut arabic = 0usize;
        let mut cyrillic = 0usize;

        for ch in text.chars() {
            if !ch.is_alphabetic() {
                continue;
            }
            letters += 1;
            match ch as u32 {
                0x0900..=0x097F => devanagari += 1,
                0x0A00..=0x0A7F => gurmukhi += 1,
                0x0600..=0x06FF | 0x0750..=0x077F => arabic += 1,
                0x0400..=0x04FF => cyrillic += 1,
                _ => {}
            }
        }

        if letters == 0 {
            return None;
        }

        let share = |count: usize| count as f32 / letters as f32;
        let candidates = [
            (devanagari, Language::Hi),
            (gurmukhi, Language::Pa),
            (arabic, Language::Ur),
            (cyrillic, Language::Ru),
        ];

        candidates
            .iter()
            .filter(|(count, _)| share(*count) >= SCRIPT_SHARE_THRESHOLD)
            .max_by_key(|(count, _)| *count)
            .map(|(_, lang)| *lang)
    }

    /// True when the text contains any non-Latin letter at all
    pub fn has_non_latin(&self, text: &str) -> bool {
        text.chars()
            .any(|ch| ch.is_alphabetic() && !ch.is_ascii() && !is_extended_latin(ch))
    }
}

fn is_extended_latin(ch: char) -> bool {
    matches!(ch as u32, 0x00C0..=0x024F | 0x1E00..=0x1EFF)
}

/// Detect a language from script inspection of the raw text
pub fn detect_script_language(text: &str) -> Option<Language> {
    ScriptDetector::new().detect(text)
}

/// Detect a language from known romanized phrases in normalized text
pub fn detect_romanized_language(normalized: &str) -> Option<Language> {
    let padded = format!(" {} ", normalized);
    ROMANIZED_PHRASES
        .iter()
        .find(|(phrase, _)| padded.contains(&format!(" {} ", phrase)))
        .map(|(_, lang)| *lang)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devanagari_detected() {
        assert_eq!(detect_script_language("शाकाहारी पिज़्ज़ा"), Some(Language::Hi));
    }

    #[test]
    fn test_gurmukhi_detected() {
        assert_eq!(detect_script_language("ਸ਼ਾਕਾਹਾਰੀ ਖਾਣਾ"), Some(Language::Pa));
    }

    #[test]
    fn test_arabic_detected() {
        assert_eq!(detect_script_language("حلال کھانا"), Some(Language::Ur));
    }

    #[test]
    fn test_cyrillic_detected() {
        assert_eq!(detect_script_language("вегетарианская пицца"), Some(Language::Ru));
    }

    #[test]
    fn test_latin_not_detected() {
        assert_eq!(detect_script_language("veg pizza in Malmö"), None);
    }

    #[test]
    fn test_stray_character_below_threshold() {
        // One Devanagari letter in a long Latin query is noise
        assert_eq!(detect_script_language("I would like some vegetarian pizza क"), None);
    }

    #[test]
    fn test_romanized_hindi() {
        assert_eq!(detect_romanized_language("paneer kya hai"), Some(Language::Hi));
    }

    #[test]
    fn test_romanized_punjabi() {
        assert_eq!(detect_romanized_language("eh ki ha"), Some(Language::Pa));
    }

    #[test]
    fn test_romanized_needs_word_boundary() {
        // "kitna" inside another word must not match
        assert_eq!(detect_romanized_language("bakitnats"), None);
    }

    #[test]
    fn test_accented_latin_is_latin() {
        assert!(!ScriptDetector::new().has_non_latin("crème brûlée smörgås"));
    }
}
