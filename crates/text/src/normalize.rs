//! Text normalization
//!
//! Lowercases, strips punctuation and emoji while keeping Unicode letters
//! and numbers (accented Latin, Devanagari, Gurmukhi, Arabic, Cyrillic all
//! survive), and collapses whitespace. Tokenization is word-boundary based
//! via unicode-segmentation so grapheme clusters stay intact.

use unicode_segmentation::UnicodeSegmentation;

/// Normalize to a single lowercased, punctuation-free string
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Normalize and split into tokens
pub fn normalize(text: &str) -> Vec<String> {
    normalize_text(text)
        .unicode_words()
        .map(|w| w.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_strip_punctuation() {
        assert_eq!(normalize_text("Hello, World!!"), "hello world");
    }

    #[test]
    fn test_emoji_stripped() {
        assert_eq!(normalize("pizza 🍕 please"), vec!["pizza", "please"]);
    }

    #[test]
    fn test_accents_preserved() {
        assert_eq!(normalize_text("Crème Brûlée"), "crème brûlée");
    }

    #[test]
    fn test_devanagari_preserved() {
        let tokens = normalize("शाकाहारी खाना?");
        assert_eq!(tokens, vec!["शाकाहारी", "खाना"]);
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_text("  veg   pizza  "), "veg pizza");
    }
}
