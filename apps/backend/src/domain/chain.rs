//! Pure word-chain rules: whether a candidate word legally continues the
//! chain from the previous word, and the suffix/prefix decomposition used
//! by clients to display the required linking unit.
//!
//! All functions are stateless; the coordinator calls them per submission
//! and discards the submitted word once the turn resolves.

use crate::domain::kana::{
    is_playable_word, is_small_form, vowel_kana, BANNED_TERMINAL, PROLONGED_SOUND_MARK,
};

fn ends_in_prolonged_mark(chars: &[char]) -> bool {
    chars.last() == Some(&PROLONGED_SOUND_MARK)
}

/// Strips trailing prolonged sound marks. May return an empty slice for
/// input consisting only of marks.
fn trim_prolonged_marks(chars: &[char]) -> &[char] {
    let end = chars
        .iter()
        .rposition(|&c| c != PROLONGED_SOUND_MARK)
        .map_or(0, |i| i + 1);
    &chars[..end]
}

/// The trailing linking unit of a word: its last mora together with any
/// small combining forms attached to it (てぃっしゅ -> しゅ).
fn trailing_unit(chars: &[char]) -> &[char] {
    let start = chars.iter().rposition(|&c| !is_small_form(c)).unwrap_or(0);
    &chars[start..]
}

fn starts_with(chars: &[char], unit: &[char]) -> bool {
    chars.len() >= unit.len() && chars[..unit.len()] == *unit
}

/// Decides whether `candidate` legally continues the chain from `previous`.
///
/// Both words must be non-empty hiragana (the prolonged sound mark is
/// allowed). The candidate may not reduce to nothing after stripping
/// trailing marks and may not end in ん even behind trailing marks. The
/// candidate must then start with `previous`'s linking unit; when
/// `previous` ends in a prolonged mark the requirement relaxes to the vowel
/// kana of the mora preceding the mark.
pub fn is_valid_transition(previous: &str, candidate: &str) -> bool {
    let prev: Vec<char> = previous.chars().collect();
    let cand: Vec<char> = candidate.chars().collect();

    if !is_playable_word(&prev) || !is_playable_word(&cand) {
        return false;
    }

    // Rejects submissions like "ーー" and bans ん even behind trailing marks.
    let trimmed_cand = trim_prolonged_marks(&cand);
    match trimmed_cand.last() {
        None => return false,
        Some(&last) if last == BANNED_TERMINAL => return false,
        Some(_) => {}
    }

    if ends_in_prolonged_mark(&prev) {
        let trimmed_prev = trim_prolonged_marks(&prev);
        let Some(&last) = trimmed_prev.last() else {
            return false;
        };
        cand.first() == Some(&vowel_kana(last))
    } else {
        starts_with(&cand, trailing_unit(&prev))
    }
}

/// The linking-unit description of `word`'s ending: the vowel kana when the
/// word ends in a prolonged mark, otherwise the literal trailing unit.
pub fn suffix(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if ends_in_prolonged_mark(&chars) {
        let trimmed = trim_prolonged_marks(&chars);
        match trimmed.last() {
            Some(&last) => vowel_kana(last).to_string(),
            None => String::new(),
        }
    } else {
        trailing_unit(&chars).iter().collect()
    }
}

/// `word` with its trailing linking unit removed. A single mora, or a single
/// mora plus its small forms, leaves nothing.
pub fn prefix(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= 1 {
        return String::new();
    }

    if ends_in_prolonged_mark(&chars) {
        return trim_prolonged_marks(&chars).iter().collect();
    }

    let unit_len = trailing_unit(&chars).len();
    chars[..chars.len() - unit_len].iter().collect()
}
