//! Fuzzy field matching.
//!
//! A contiguous (substring) match always outscores a scattered
//! (subsequence) match of the same query: substring matches earn
//! [`EXACT_CHAR_SCORE`] per query character, while a subsequence character
//! can earn at most `1 + CONSECUTIVE_BONUS + WORD_START_BONUS`.

/// Per-character score of a substring match.
pub const EXACT_CHAR_SCORE: u32 = 10;
/// Extra score when a substring match starts the field.
pub const FIELD_START_BONUS: u32 = 5;
/// Extra score when a substring match starts a word.
pub const EXACT_WORD_START_BONUS: u32 = 3;

const SUBSEQUENCE_CHAR_SCORE: u32 = 1;
const CONSECUTIVE_BONUS: u32 = 2;
const WORD_START_BONUS: u32 = 2;

/// Score and matched character positions of a query against one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub score: u32,
    /// Character (not byte) indices into the field text, ascending.
    pub positions: Vec<usize>,
    /// Whether the query matched as a contiguous substring.
    pub exact: bool,
}

/// Matches `query` against `text`, case-insensitively.
///
/// Returns `None` for an empty query or when not every query character can
/// be found in order.
pub fn fuzzy_match(query: &str, text: &str) -> Option<FuzzyMatch> {
    let needle: Vec<char> = query.trim().chars().map(fold).collect();
    if needle.is_empty() {
        return None;
    }
    let haystack: Vec<char> = text.chars().collect();
    let folded: Vec<char> = haystack.iter().copied().map(fold).collect();

    exact_match(&needle, &haystack, &folded)
        .or_else(|| subsequence_match(&needle, &haystack, &folded))
}

// One char in, one char out, so positions stay aligned with the original.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn is_word_start(chars: &[char], i: usize) -> bool {
    i == 0 || !chars[i - 1].is_alphanumeric()
}

fn exact_match(needle: &[char], haystack: &[char], folded: &[char]) -> Option<FuzzyMatch> {
    if needle.len() > folded.len() {
        return None;
    }
    let starts: Vec<usize> = (0..=folded.len() - needle.len())
        .filter(|&i| folded[i..i + needle.len()] == *needle)
        .collect();
    // Prefer an occurrence that starts a word.
    let start = starts
        .iter()
        .copied()
        .find(|&i| is_word_start(haystack, i))
        .or_else(|| starts.first().copied())?;

    let mut score = EXACT_CHAR_SCORE * needle.len() as u32;
    if start == 0 {
        score += FIELD_START_BONUS;
    }
    if is_word_start(haystack, start) {
        score += EXACT_WORD_START_BONUS;
    }
    Some(FuzzyMatch {
        score,
        positions: (start..start + needle.len()).collect(),
        exact: true,
    })
}

fn subsequence_match(needle: &[char], haystack: &[char], folded: &[char]) -> Option<FuzzyMatch> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut score = 0;
    let mut from = 0;

    for &wanted in needle {
        let offset = folded[from..].iter().position(|&c| c == wanted)?;
        let i = from + offset;

        score += SUBSEQUENCE_CHAR_SCORE;
        if positions.last().is_some_and(|&prev| prev + 1 == i) {
            score += CONSECUTIVE_BONUS;
        }
        if is_word_start(haystack, i) {
            score += WORD_START_BONUS;
        }
        positions.push(i);
        from = i + 1;
    }

    Some(FuzzyMatch {
        score,
        positions,
        exact: false,
    })
}
