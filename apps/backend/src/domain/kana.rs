//! Character-level classification for the hiragana syllabary.
//!
//! Classification is derived from each character's canonical Unicode name
//! rather than a fixed lookup table, so archaic and rare syllables follow
//! the same rules as the common ones. A hiragana mora is any character whose
//! name starts with `HIRAGANA LETTER`; small combining forms carry `SMALL`
//! in the name; the vowel class of a mora is the trailing vowel letter of
//! its name (`HIRAGANA LETTER KA` -> A).

/// The katakana-hiragana prolonged sound mark, which extends the preceding
/// vowel without adding a new mora.
pub const PROLONGED_SOUND_MARK: char = 'ー';

/// The banned terminal syllable: no word may end in ん.
pub const BANNED_TERMINAL: char = 'ん';

const HIRAGANA_NAME_PREFIX: &str = "HIRAGANA LETTER ";
const SMALL_NAME_MARKER: &str = " SMALL ";

fn char_name(c: char) -> Option<String> {
    unicode_names2::name(c).map(|name| name.to_string())
}

/// True when the character belongs to the playable alphabet: a hiragana
/// letter or the prolonged sound mark.
pub fn is_playable(c: char) -> bool {
    if c == PROLONGED_SOUND_MARK {
        return true;
    }
    char_name(c).is_some_and(|name| name.starts_with(HIRAGANA_NAME_PREFIX))
}

/// True when every character of the word is playable. Empty words are not.
pub fn is_playable_word(chars: &[char]) -> bool {
    !chars.is_empty() && chars.iter().all(|&c| is_playable(c))
}

/// True for reduced-size forms (ゃ, ゅ, ょ, っ, ぁ, ...) that combine with
/// the preceding full-size character into one linking unit.
pub fn is_small_form(c: char) -> bool {
    char_name(c).is_some_and(|name| name.contains(SMALL_NAME_MARKER))
}

/// The vowel-class kana (あ/い/う/え/お) of a mora, read off the trailing
/// vowel letter of its canonical name. Falls back to お for names that do
/// not end in a vowel letter (ん is the only such hiragana).
pub fn vowel_kana(c: char) -> char {
    let Some(name) = char_name(c) else {
        return 'お';
    };
    match name.chars().last() {
        Some('A') => 'あ',
        Some('I') => 'い',
        Some('U') => 'う',
        Some('E') => 'え',
        Some('O') => 'お',
        _ => 'お',
    }
}
