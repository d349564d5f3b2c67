//! Search input acceptability.
//!
//! A search value is a normalized Greek string: base letters plus digamma,
//! any case, with single inner spaces. Anything else cannot match a
//! `searchable` column and is refused before a query is built.

use std::sync::LazyLock;

use regex::Regex;

/// Longest headword in the dictionary, in characters.
pub const MAX_SEARCH_CHARS: usize = 35;

/// Longest run of one repeated character that is still accepted.
pub const MAX_REPEATED_RUN: usize = 3;

static OUTSIDE_ALPHABET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[^αβγδεζηθικλμνξοπρστυφχψωϝ\s]").expect("alphabet pattern is valid")
});

static BAD_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s|[h\s]{2,}").expect("spacing pattern is valid"));

/// Returns `true` when `s` is a well-formed search value.
///
/// Rejects on any of: more than [`MAX_SEARCH_CHARS`] characters, a run of
/// more than [`MAX_REPEATED_RUN`] identical characters, a character outside
/// the alphabet, a leading space, or two consecutive spaces/`h`.
#[must_use]
pub fn is_acceptable(s: &str) -> bool {
    s.chars().count() <= MAX_SEARCH_CHARS
        && longest_run(s) <= MAX_REPEATED_RUN
        && !OUTSIDE_ALPHABET.is_match(s)
        && !BAD_SPACING.is_match(s)
}

fn longest_run(s: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;
    for c in s.chars() {
        if previous == Some(c) {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }
    longest
}
