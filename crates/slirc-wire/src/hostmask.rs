//! User hostmasks.
//!
//! A hostmask identifies a protocol participant as `nick[!ident][@host]`.
//! Both the ident and host parts are optional on the wire: servers send bare
//! nicknames in NAMES replies and bare server names as message sources.

use std::fmt;
use std::str::FromStr;

use crate::casemap::CaseMapping;
use crate::util::wildcard_match;

/// A parsed `nick!ident@host` identity.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hostmask {
    /// Nickname (or server name for server-originated lines).
    pub nickname: String,
    /// Ident/username, when present.
    pub ident: Option<String>,
    /// Hostname, when present.
    pub host: Option<String>,
}

impl Hostmask {
    /// Build a full hostmask from its three parts.
    pub fn new(nick: impl Into<String>, ident: impl Into<String>, host: impl Into<String>) -> Self {
        Hostmask {
            nickname: nick.into(),
            ident: Some(ident.into()),
            host: Some(host.into()),
        }
    }

    /// A hostmask carrying only a nickname.
    pub fn from_nick(nick: impl Into<String>) -> Self {
        Hostmask {
            nickname: nick.into(),
            ident: None,
            host: None,
        }
    }

    /// Parse a hostmask leniently.
    ///
    /// A leading `:` (the wire prefix marker) is removed first. Empty ident
    /// or host parts are treated as absent.
    ///
    /// ```
    /// use slirc_wire::Hostmask;
    ///
    /// let mask = Hostmask::parse(":alice!al@example.org");
    /// assert_eq!(mask.nickname, "alice");
    /// assert_eq!(mask.ident.as_deref(), Some("al"));
    /// assert_eq!(mask.host.as_deref(), Some("example.org"));
    ///
    /// let bare = Hostmask::parse("bob");
    /// assert!(bare.ident.is_none() && bare.host.is_none());
    /// ```
    pub fn parse(s: &str) -> Self {
        let s = s.strip_prefix(':').unwrap_or(s);

        let (before_at, host) = match s.find('@') {
            Some(at) => (&s[..at], Some(&s[at + 1..])),
            None => (s, None),
        };

        let (nick, ident) = match before_at.find('!') {
            Some(bang) => (&before_at[..bang], Some(&before_at[bang + 1..])),
            None => (before_at, None),
        };

        let non_empty = |part: Option<&str>| part.filter(|p| !p.is_empty()).map(str::to_owned);

        Hostmask {
            nickname: nick.to_owned(),
            ident: non_empty(ident),
            host: non_empty(host),
        }
    }

    /// Lookup key for the nickname under `casemap`.
    pub fn key(&self, casemap: CaseMapping) -> String {
        casemap.fold(&self.nickname)
    }

    /// Whether both masks name the same nickname under `casemap`.
    pub fn same_nick(&self, other: &Hostmask, casemap: CaseMapping) -> bool {
        casemap.eq(&self.nickname, &other.nickname)
    }

    /// Whether this looks like a server name rather than a user.
    pub fn is_server(&self) -> bool {
        self.ident.is_none() && self.host.is_none() && self.nickname.contains('.')
    }

    /// Match against a wildcard mask such as `*!*@*.example.org`.
    ///
    /// Missing parts are matched as empty strings, so `nick!*@*` matches a
    /// bare `nick`.
    pub fn matches(&self, pattern: &str, casemap: CaseMapping) -> bool {
        let full = format!(
            "{}!{}@{}",
            self.nickname,
            self.ident.as_deref().unwrap_or(""),
            self.host.as_deref().unwrap_or("")
        );
        wildcard_match(pattern, &full, casemap)
    }
}

impl fmt::Display for Hostmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nickname)?;
        if let Some(ref ident) = self.ident {
            write!(f, "!{}", ident)?;
        }
        if let Some(ref host) = self.host {
            write!(f, "@{}", host)?;
        }
        Ok(())
    }
}

impl FromStr for Hostmask {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Hostmask::parse(s))
    }
}

impl From<&str> for Hostmask {
    fn from(s: &str) -> Self {
        Hostmask::parse(s)
    }
}
