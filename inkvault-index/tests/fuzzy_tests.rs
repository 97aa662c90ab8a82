use inkvault_index::fuzzy::{EXACT_CHAR_SCORE, FIELD_START_BONUS};
use inkvault_index::fuzzy_match;

// ── exact substring ──────────────────────────────────────────────

#[test]
fn substring_match_positions() {
    let m = fuzzy_match("plan", "Project plan").unwrap();
    assert!(m.exact);
    assert_eq!(m.positions, vec![8, 9, 10, 11]);
}

#[test]
fn match_is_case_insensitive() {
    let m = fuzzy_match("PLAN", "project Plan").unwrap();
    assert!(m.exact);
    assert_eq!(m.positions, vec![8, 9, 10, 11]);
}

#[test]
fn field_start_scores_highest() {
    let start = fuzzy_match("plan", "plan ahead").unwrap();
    let word = fuzzy_match("plan", "the plan").unwrap();
    let inner = fuzzy_match("plan", "explanation").unwrap();

    assert_eq!(start.score, EXACT_CHAR_SCORE * 4 + FIELD_START_BONUS + 3);
    assert!(start.score > word.score);
    assert!(word.score > inner.score);
}

#[test]
fn word_start_occurrence_is_preferred() {
    let m = fuzzy_match("cat", "concat cat").unwrap();
    assert_eq!(m.positions, vec![7, 8, 9]);
}

#[test]
fn query_is_trimmed() {
    let m = fuzzy_match("  notes ", "my notes").unwrap();
    assert_eq!(m.positions, vec![3, 4, 5, 6, 7]);
}

// ── subsequence ──────────────────────────────────────────────────

#[test]
fn subsequence_match_positions() {
    let m = fuzzy_match("pjp", "Project plan").unwrap();
    assert!(!m.exact);
    assert_eq!(m.positions, vec![0, 3, 8]);
}

#[test]
fn exact_beats_subsequence_for_same_query() {
    let exact = fuzzy_match("road", "the roadmap").unwrap();
    let scattered = fuzzy_match("road", "rough old ad").unwrap();
    assert!(exact.exact);
    assert!(!scattered.exact);
    assert!(exact.score > scattered.score);
}

#[test]
fn consecutive_runs_score_higher() {
    let run = fuzzy_match("abx", "abzzzx").unwrap();
    let spread = fuzzy_match("abx", "azbzzx").unwrap();
    assert!(run.score > spread.score);
}

#[test]
fn positions_are_character_indices() {
    // "é" does not fold to "e": only a scattered match remains.
    let m = fuzzy_match("cafe", "Le Café est").unwrap();
    assert!(!m.exact);
    assert_eq!(m.positions, vec![3, 4, 5, 8]);

    let m = fuzzy_match("café", "Le Café est").unwrap();
    assert_eq!(m.positions, vec![3, 4, 5, 6]);
}

// ── no match ─────────────────────────────────────────────────────

#[test]
fn empty_query_matches_nothing() {
    assert!(fuzzy_match("", "anything").is_none());
    assert!(fuzzy_match("   ", "anything").is_none());
}

#[test]
fn missing_characters_do_not_match() {
    assert!(fuzzy_match("xyz", "Project plan").is_none());
    assert!(fuzzy_match("planned", "plan").is_none());
}

#[test]
fn out_of_order_characters_do_not_match() {
    assert!(fuzzy_match("ba", "ab").is_none());
}
