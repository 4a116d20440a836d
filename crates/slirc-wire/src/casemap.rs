//! IRC case-mapping.
//!
//! Servers declare how nicknames and channel names compare through the
//! `CASEMAPPING` ISUPPORT token. Besides ASCII folding, the RFC 1459 family
//! treats some punctuation as the "lowercase" of other punctuation.

use std::fmt;

/// A server-declared case-mapping rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseMapping {
    /// Plain ASCII folding, `A-Z` to `a-z`.
    Ascii,
    /// ASCII plus `[` `]` `\` to `{` `}` `|`.
    #[default]
    StrictRfc1459,
    /// `strict-rfc1459` plus `~` to `^`.
    Rfc1459,
}

impl CaseMapping {
    /// Parse a `CASEMAPPING` token value. Unknown mappings yield `None`.
    pub fn from_token(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ascii" => Some(CaseMapping::Ascii),
            "strict-rfc1459" => Some(CaseMapping::StrictRfc1459),
            "rfc1459" => Some(CaseMapping::Rfc1459),
            _ => None,
        }
    }

    /// The token name a server would use for this mapping.
    pub const fn token(self) -> &'static str {
        match self {
            CaseMapping::Ascii => "ascii",
            CaseMapping::StrictRfc1459 => "strict-rfc1459",
            CaseMapping::Rfc1459 => "rfc1459",
        }
    }

    /// Fold a single character to its lowercase form under this mapping.
    #[inline]
    pub const fn fold_char(self, c: char) -> char {
        match (self, c) {
            (_, 'A'..='Z') => (c as u8 + 32) as char,
            (CaseMapping::Ascii, _) => c,
            (_, '[') => '{',
            (_, ']') => '}',
            (_, '\\') => '|',
            (CaseMapping::Rfc1459, '~') => '^',
            _ => c,
        }
    }

    /// Fold a whole string; the result is the lookup key for that name.
    pub fn fold(self, s: &str) -> String {
        s.chars().map(|c| self.fold_char(c)).collect()
    }

    /// Case-insensitive equality under this mapping.
    pub fn eq(self, a: &str, b: &str) -> bool {
        if a.len() != b.len() {
            return false;
        }

        a.chars()
            .zip(b.chars())
            .all(|(ca, cb)| self.fold_char(ca) == self.fold_char(cb))
    }
}

impl fmt::Display for CaseMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
