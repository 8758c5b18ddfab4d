#![cfg(test)]

use crate::domain::chain::{is_valid_transition, prefix, suffix};
use crate::domain::kana::{is_playable, is_small_form, vowel_kana};

#[test]
fn plain_last_character_links_the_chain() {
    assert!(is_valid_transition("あか", "かき"));
    assert!(!is_valid_transition("あか", "きく"));
    assert!(is_valid_transition("かき", "きって"));
}

#[test]
fn prolonged_ending_relaxes_to_vowel_kana() {
    // らんかー ends in a prolonged mark after か (vowel class A): the next
    // word must start with あ itself, not just any A-class syllable.
    assert!(is_valid_transition("らんかー", "あか"));
    assert!(!is_valid_transition("らんかー", "かき"));

    assert!(is_valid_transition("すきー", "いす"));
    assert!(is_valid_transition("ぶどー", "おに"));
}

#[test]
fn small_form_combination_is_preserved_as_linking_unit() {
    assert!(is_valid_transition("てぃっしゅ", "しゅっぱつ"));
    assert!(!is_valid_transition("てぃっしゅ", "ゆき"));
}

#[test]
fn empty_and_mark_only_candidates_are_rejected() {
    assert!(!is_valid_transition("あか", ""));
    assert!(!is_valid_transition("", "あか"));
    assert!(!is_valid_transition("あか", "ーー"));
    assert!(!is_valid_transition("ーー", "あか"));
}

#[test]
fn banned_ending_survives_trailing_prolonged_marks() {
    assert!(!is_valid_transition("かもめ", "めん"));
    assert!(!is_valid_transition("かもめ", "めんー"));
}

#[test]
fn non_hiragana_words_are_rejected() {
    assert!(!is_valid_transition("あか", "カキ"));
    assert!(!is_valid_transition("あか", "kaki"));
    assert!(!is_valid_transition("アカ", "かき"));
}

#[test]
fn suffix_of_prolonged_ending_is_the_vowel_kana() {
    assert_eq!(suffix("さー"), "あ");
    assert_eq!(suffix("すきー"), "い");
    assert_eq!(suffix("ぶどー"), "お");
    assert_eq!(suffix("さーーー"), "あ");
}

#[test]
fn suffix_of_plain_ending_is_the_trailing_unit() {
    assert_eq!(suffix("あか"), "か");
    assert_eq!(suffix("てぃっしゅ"), "しゅ");
    assert_eq!(suffix("あ"), "あ");
}

#[test]
fn prefix_strips_the_trailing_linking_unit() {
    assert_eq!(prefix("さー"), "さ");
    assert_eq!(prefix("あか"), "あ");
    assert_eq!(prefix("てぃっしゅ"), "てぃっ");
}

#[test]
fn prefix_of_single_unit_words_is_empty() {
    assert_eq!(prefix("あ"), "");
    assert_eq!(prefix("しゅ"), "");
}

#[test]
fn classification_comes_from_canonical_names() {
    assert!(is_playable('あ'));
    assert!(is_playable('ー'));
    assert!(!is_playable('ア'));
    assert!(!is_playable('a'));

    assert!(is_small_form('ゃ'));
    assert!(is_small_form('っ'));
    assert!(!is_small_form('や'));

    assert_eq!(vowel_kana('か'), 'あ');
    assert_eq!(vowel_kana('き'), 'い');
    assert_eq!(vowel_kana('く'), 'う');
    assert_eq!(vowel_kana('け'), 'え');
    assert_eq!(vowel_kana('こ'), 'お');
    // ん has no vowel letter in its name; falls back to お.
    assert_eq!(vowel_kana('ん'), 'お');
}
