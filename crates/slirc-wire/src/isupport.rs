//! ISUPPORT (`005`) token parsing.
//!
//! Servers advertise their dialect in one or more `RPL_ISUPPORT` replies:
//! `:server 005 <nick> KEY KEY=VALUE ... :are supported by this server`.
//! The engine reads `CASEMAPPING`, `PREFIX`, `CHANMODES`, `CHANTYPES` and
//! `NETWORK` from them.

use crate::casemap::CaseMapping;

/// A single ISUPPORT key-value entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    /// The token key (e.g., `NETWORK`, `CHANTYPES`).
    pub key: &'a str,
    /// The optional value (e.g., `Libera.Chat` for `NETWORK=Libera.Chat`).
    pub value: Option<&'a str>,
}

/// Tokens from one `RPL_ISUPPORT` reply.
///
/// ```
/// use slirc_wire::Isupport;
///
/// let isupport = Isupport::from_params(&["me", "NETWORK=TestNet", "PREFIX=(ov)@+", "are supported"]);
/// assert_eq!(isupport.network(), Some("TestNet"));
/// assert_eq!(isupport.prefix().unwrap().symbol_for_mode('o'), Some('@'));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    /// Parse from the parameters of a `005` reply.
    ///
    /// The first parameter (our nickname) is skipped, as is a final
    /// free-text parameter containing spaces.
    pub fn from_params<S: AsRef<str>>(params: &'a [S]) -> Self {
        let mut tokens: Vec<&'a str> = params.iter().skip(1).map(|p| p.as_ref()).collect();
        if tokens.last().is_some_and(|last| last.contains(' ')) {
            tokens.pop();
        }
        parse_tokens(&tokens)
    }

    /// Iterate all entries in wire order.
    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    /// Look up a token. `Some(None)` means present without a value.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .find(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }

    /// The `CASEMAPPING` token, if the mapping is known.
    pub fn casemapping(&self) -> Option<CaseMapping> {
        self.get("CASEMAPPING")
            .flatten()
            .and_then(CaseMapping::from_token)
    }

    /// The `CHANTYPES` token value.
    pub fn chantypes(&self) -> Option<&'a str> {
        self.get("CHANTYPES").flatten()
    }

    /// The `NETWORK` token value.
    pub fn network(&self) -> Option<&'a str> {
        self.get("NETWORK").flatten()
    }

    /// The `PREFIX` token.
    pub fn prefix(&self) -> Option<PrefixSpec> {
        self.get("PREFIX").flatten().and_then(PrefixSpec::parse)
    }

    /// The `CHANMODES` token.
    pub fn chanmodes(&self) -> Option<ChanModes> {
        self.get("CHANMODES").flatten().and_then(ChanModes::parse)
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tokens were present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_tokens<'a>(tokens: &[&'a str]) -> Isupport<'a> {
    let mut entries = Vec::with_capacity(tokens.len());
    for &p in tokens {
        if p.is_empty() {
            continue;
        }
        let (key, value) = match p.find('=') {
            Some(eq) => (&p[..eq], Some(&p[eq + 1..])),
            None => (p, None),
        };
        entries.push(IsupportEntry { key, value });
    }
    Isupport { entries }
}

/// The `PREFIX` token: channel membership modes and their nick symbols.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrefixSpec {
    /// Mode letters, highest rank first (e.g., `ov`).
    pub modes: String,
    /// Symbols in the same order (e.g., `@+`).
    pub symbols: String,
}

impl Default for PrefixSpec {
    fn default() -> Self {
        PrefixSpec {
            modes: "ov".to_owned(),
            symbols: "@+".to_owned(),
        }
    }
}

impl PrefixSpec {
    /// Parse a `PREFIX` value like `(ov)@+`.
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix('(')?;
        let close = rest.find(')')?;
        let modes = &rest[..close];
        let symbols = &rest[close + 1..];
        if modes.is_empty() || modes.chars().count() != symbols.chars().count() {
            return None;
        }
        Some(PrefixSpec {
            modes: modes.to_owned(),
            symbols: symbols.to_owned(),
        })
    }

    /// Whether `mode` is a membership mode on this server.
    #[inline]
    pub fn is_prefix_mode(&self, mode: char) -> bool {
        self.modes.contains(mode)
    }

    /// The nick symbol for a membership mode, e.g. `o` to `@`.
    pub fn symbol_for_mode(&self, mode: char) -> Option<char> {
        self.modes
            .chars()
            .position(|c| c == mode)
            .and_then(|i| self.symbols.chars().nth(i))
    }

    /// The membership mode for a nick symbol, e.g. `+` to `v`.
    pub fn mode_for_symbol(&self, symbol: char) -> Option<char> {
        self.symbols
            .chars()
            .position(|c| c == symbol)
            .and_then(|i| self.modes.chars().nth(i))
    }

    /// Rank of a membership mode; lower is more privileged.
    pub fn rank(&self, mode: char) -> Option<usize> {
        self.modes.chars().position(|c| c == mode)
    }

    /// Split leading status symbols off a NAMES entry such as `@+nick`.
    ///
    /// Returns the membership modes found and the remaining name.
    pub fn strip_symbols<'n>(&self, entry: &'n str) -> (Vec<char>, &'n str) {
        let mut modes = Vec::new();
        let mut rest = entry;
        while let Some(c) = rest.chars().next() {
            match self.mode_for_symbol(c) {
                Some(mode) => {
                    modes.push(mode);
                    rest = &rest[c.len_utf8()..];
                }
                None => break,
            }
        }
        (modes, rest)
    }
}

/// How a channel mode letter consumes parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeClass {
    /// Type A: list modes such as bans; always take a parameter.
    List,
    /// Type B: always take a parameter (e.g., key).
    Always,
    /// Type C: take a parameter only when set (e.g., limit).
    OnSet,
    /// Type D: flags without a parameter.
    Flag,
}

/// The `CHANMODES` token: channel modes grouped by parameter behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChanModes {
    /// Type A letters.
    pub a: String,
    /// Type B letters.
    pub b: String,
    /// Type C letters.
    pub c: String,
    /// Type D letters.
    pub d: String,
}

impl Default for ChanModes {
    fn default() -> Self {
        ChanModes {
            a: "beI".to_owned(),
            b: "k".to_owned(),
            c: "l".to_owned(),
            d: "imnpst".to_owned(),
        }
    }
}

impl ChanModes {
    /// Parse a `CHANMODES` value like `b,k,l,imnpst`.
    ///
    /// Groups beyond the fourth are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(',');
        let (a, b, c, d) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        Some(ChanModes {
            a: a.to_owned(),
            b: b.to_owned(),
            c: c.to_owned(),
            d: d.to_owned(),
        })
    }

    /// Class of a mode letter; unknown letters are treated as flags.
    pub fn class_of(&self, mode: char) -> ModeClass {
        if self.a.contains(mode) {
            ModeClass::List
        } else if self.b.contains(mode) {
            ModeClass::Always
        } else if self.c.contains(mode) {
            ModeClass::OnSet
        } else {
            ModeClass::Flag
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_params_skips_nick_and_text() {
        let params = vec![
            "me".to_string(),
            "CASEMAPPING=ascii".to_string(),
            "EXCEPTS".to_string(),
            "are supported by this server".to_string(),
        ];
        let isupport = Isupport::from_params(&params);
        assert_eq!(isupport.len(), 2);
        assert_eq!(isupport.casemapping(), Some(CaseMapping::Ascii));
        assert_eq!(isupport.get("excepts"), Some(None));
        assert_eq!(isupport.get("NETWORK"), None);
    }

    #[test]
    fn test_prefix_spec() {
        let spec = PrefixSpec::parse("(qaohv)~&@%+").unwrap();
        assert_eq!(spec.symbol_for_mode('h'), Some('%'));
        assert_eq!(spec.mode_for_symbol('~'), Some('q'));
        assert_eq!(spec.rank('o'), Some(2));
        assert!(PrefixSpec::parse("(ov)@").is_none());
        assert!(PrefixSpec::parse("@+").is_none());
    }

    #[test]
    fn test_strip_symbols() {
        let spec = PrefixSpec::default();
        assert_eq!(spec.strip_symbols("@+nick"), (vec!['o', 'v'], "nick"));
        assert_eq!(spec.strip_symbols("plain"), (vec![], "plain"));
    }

    #[test]
    fn test_chanmodes_classes() {
        let modes = ChanModes::parse("beI,k,l,imnpst").unwrap();
        assert_eq!(modes.class_of('b'), ModeClass::List);
        assert_eq!(modes.class_of('k'), ModeClass::Always);
        assert_eq!(modes.class_of('l'), ModeClass::OnSet);
        assert_eq!(modes.class_of('n'), ModeClass::Flag);
        assert_eq!(modes.class_of('Z'), ModeClass::Flag);
        assert!(ChanModes::parse("b,k").is_none());
    }
}
