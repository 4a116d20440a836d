//! Wildcard mask matching.

use crate::casemap::CaseMapping;

/// Match `text` against an IRC wildcard `pattern`.
///
/// `*` matches any run of characters (including none) and `?` matches
/// exactly one. Both sides are folded with `casemap` first.
///
/// ```
/// use slirc_wire::{wildcard_match, CaseMapping};
///
/// assert!(wildcard_match("*!*@*.example.org", "nick!u@a.example.org", CaseMapping::Ascii));
/// assert!(wildcard_match("n?ck", "NICK", CaseMapping::Ascii));
/// assert!(!wildcard_match("n?ck", "nk", CaseMapping::Ascii));
/// ```
pub fn wildcard_match(pattern: &str, text: &str, casemap: CaseMapping) -> bool {
    let pattern: Vec<char> = pattern.chars().map(|c| casemap.fold_char(c)).collect();
    let text: Vec<char> = text.chars().map(|c| casemap.fold_char(c)).collect();

    wildcard_match_impl(&pattern, &text)
}

/// Iterative matcher with single-star backtracking.
fn wildcard_match_impl(pattern: &[char], text: &[char]) -> bool {
    let mut p = 0;
    let mut t = 0;
    let mut star_p = None;
    let mut star_t = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star_p = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(sp) = star_p {
            p = sp + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}
