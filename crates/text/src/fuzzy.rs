//! Fuzzy token similarity
//!
//! Tolerates the spelling variants that show up constantly in food
//! queries: doubled vowels ("panner"/"paneer"), ph/f swaps
//! ("phulka"/"fulka"), plural suffixes, and small typos. Used both for
//! dish-name matching and restaurant-name lookup.

/// Positional character-match ratio between two equal-or-near-equal
/// length strings. A capped Hamming-style measure: compares position by
/// position over the shorter length and divides by the longer.
pub fn positional_ratio(a: &str, b: &str) -> f32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let longer = a_chars.len().max(b_chars.len());
    if longer == 0 {
        return 1.0;
    }
    let matches = a_chars
        .iter()
        .zip(b_chars.iter())
        .filter(|(x, y)| x == y)
        .count();
    matches as f32 / longer as f32
}

/// Collapse runs of the same vowel to a single occurrence
fn collapse_doubled_vowels(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev: Option<char> = None;
    for ch in s.chars() {
        let is_vowel = matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u');
        if is_vowel && prev == Some(ch) {
            continue;
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// Normalize common phonetic spellings: ph -> f, trailing plural/suffix trim
fn phonetic_form(s: &str) -> String {
    let mut out = collapse_doubled_vowels(&s.replace("ph", "f"));
    for suffix in ["es", "s", "er"] {
        if out.len() > 4 && out.ends_with(suffix) {
            out.truncate(out.len() - suffix.len());
            break;
        }
    }
    out
}

/// Whether two tokens should be treated as the same word
///
/// Checks, in order: exact equality, containment (for tokens of length
/// >= 4), phonetic-form equality, and a positional ratio >= 0.7 for tokens
/// whose lengths differ by at most 2.
pub fn fuzzy_token_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    if a.len() >= 4 && b.len() >= 4 && (a.contains(b) || b.contains(a)) {
        return true;
    }

    let pa = phonetic_form(a);
    let pb = phonetic_form(b);
    if pa == pb {
        return true;
    }

    let len_a = pa.chars().count();
    let len_b = pb.chars().count();
    if len_a.abs_diff(len_b) <= 2 && positional_ratio(&pa, &pb) >= 0.7 {
        return true;
    }
    false
}
