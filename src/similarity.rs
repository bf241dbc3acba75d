//! Name normalization and string similarity scoring.
//!
//! Scores are integers on a 0-100 scale. `ratio` is the indel similarity
//! `2 * M / T` where `M` is the longest common subsequence length and `T`
//! the combined length. The token and partial variants build on it.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Similarity score in `0..=100`.
pub type Score = u8;

/// Normalise an actor name: NFC, casefold and collapse whitespace.
///
/// This is the cache key and the form every matcher sees.
pub fn normalize_name(text: &str) -> String {
    text.nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

/// Stricter key for place names: diacritics folded, punctuation removed.
///
/// `"Côte d'Ivoire"` and `"cote d ivoire"` produce the same key.
pub fn place_key(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let key = normalize_name(&folded);
    match key.strip_prefix("the ") {
        Some(rest) => rest.to_string(),
        None => key,
    }
}

/// Alphanumeric tokens of an already-normalised string.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// LCS length using two-row DP (space-optimised).
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let n = b.len();
    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for &ca in a {
        for j in 1..=n {
            if ca == b[j - 1] {
                curr[j] = prev[j - 1] + 1;
            } else {
                curr[j] = curr[j - 1].max(prev[j]);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.fill(0);
    }
    prev[n]
}

fn raw_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    200.0 * lcs_length(a, b) as f64 / total as f64
}

fn to_score(raw: f64) -> Score {
    raw.round().clamp(0.0, 100.0) as Score
}

/// Best possible `ratio` between strings of these lengths.
///
/// Lets callers skip candidates that cannot reach a threshold.
pub fn ratio_upper_bound(a_len: usize, b_len: usize) -> Score {
    let total = a_len + b_len;
    if total == 0 {
        return 100;
    }
    to_score(200.0 * a_len.min(b_len) as f64 / total as f64)
}

/// Indel similarity of two strings, compared as given.
pub fn ratio(a: &str, b: &str) -> Score {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    to_score(raw_ratio(&a, &b))
}

fn sorted_tokens(text: &str) -> String {
    let mut toks: Vec<&str> = tokens(text).collect();
    toks.sort_unstable();
    toks.join(" ")
}

/// `ratio` after sorting the alphanumeric tokens of both sides.
///
/// Word order stops mattering: `"farmers union"` equals `"union farmers"`.
pub fn token_sort_ratio(a: &str, b: &str) -> Score {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Best `ratio` of the shorter string against every equal-length window
/// of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> Score {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if short.is_empty() {
        return if long.is_empty() { 100 } else { 0 };
    }

    let mut best = 0.0f64;
    for window in long.windows(short.len()) {
        let r = raw_ratio(short, window);
        if r > best {
            best = r;
            if best >= 100.0 {
                break;
            }
        }
    }
    to_score(best)
}

/// Total length of the distinct tokens two names share.
pub fn token_overlap_len(a: &str, b: &str) -> usize {
    let mut shared: Vec<&str> = tokens(a).filter(|t| tokens(b).any(|u| u == *t)).collect();
    shared.sort_unstable();
    shared.dedup();
    shared.iter().map(|t| t.chars().count()).sum()
}
