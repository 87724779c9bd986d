//! Order-insensitive, substring-tolerant string similarity.
//!
//! The base measure is the normalized Indel similarity from `rapidfuzz`
//! (twice the longest common subsequence over the combined length). On top
//! of it:
//! - [`partial_ratio`] slides the shorter string over the longer one and keeps
//!   the best window.
//! - [`partial_token_set_ratio`] compares the shared tokens with each side's
//!   full token set, so extra words on one side do not lower the score.

use std::collections::BTreeSet;

use rapidfuzz::distance::indel;

/// Lowercases, replaces every non-alphanumeric character with a space and
/// collapses runs of whitespace.
///
/// Non-ASCII letters are kept, so scores for accented names such as
/// "Université Exemple" differ from scorers that strip them first (for
/// example fuzzywuzzy with `force_ascii`).
pub fn default_process(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Indel similarity scaled to 0-100. Zero when either side is empty.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    indel::normalized_similarity(a.chars(), b.chars()) * 100.0
}

/// Best [`ratio`] of the shorter string against every equally long window of
/// the longer one. Zero when either side is empty.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut best = 0.0_f64;
    for window in longer.windows(shorter.len()) {
        let score =
            indel::normalized_similarity(shorter.iter().copied(), window.iter().copied()) * 100.0;
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

/// Token-set partial ratio, rounded to an integer score in `0..=100`.
///
/// Both strings are processed with [`default_process`] and split into token
/// sets. The sorted intersection is compared against the intersection plus
/// each side's remaining tokens, and the two combined strings against each
/// other; the best [`partial_ratio`] wins. When one token set contains the
/// other the score is 100.
pub fn partial_token_set_ratio(a: &str, b: &str) -> u8 {
    let a = default_process(a);
    let b = default_process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split(' ').collect();
    let tokens_b: BTreeSet<&str> = b.split(' ').collect();

    let shared = join(tokens_a.intersection(&tokens_b));
    let only_a = join(tokens_a.difference(&tokens_b));
    let only_b = join(tokens_b.difference(&tokens_a));
    let combined_a = concat(&shared, &only_a);
    let combined_b = concat(&shared, &only_b);

    let best = partial_ratio(&shared, &combined_a)
        .max(partial_ratio(&shared, &combined_b))
        .max(partial_ratio(&combined_a, &combined_b));
    to_score(best)
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn concat(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
