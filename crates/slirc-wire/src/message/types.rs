use chrono::{DateTime, Utc};

use crate::hostmask::Hostmask;

/// A decoded IRC protocol line.
///
/// Immutable once decoded. The prefix is kept verbatim (without the leading
/// `:`); turning it into a [`Hostmask`] is left to the consumer that needs
/// one, since server-originated lines carry a server name instead.
///
/// # Example
///
/// ```
/// use slirc_wire::RawMessage;
///
/// let msg: RawMessage = ":irc.example.net 001 alice :Welcome".parse().unwrap();
/// assert_eq!(msg.numeric(), Some(1));
/// assert_eq!(msg.param(1), Some("Welcome"));
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMessage {
    /// IRCv3 message tags, in wire order.
    pub tags: Vec<Tag>,
    /// Message source without the leading `:`.
    pub prefix: Option<String>,
    /// Command token, or the three digit string of a numeric reply.
    pub command: String,
    /// Parameters after the command; the trailing parameter is last.
    pub params: Vec<String>,
}

impl RawMessage {
    /// Build a message from a command and its parameters.
    pub fn new<C, I, P>(command: C, params: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        RawMessage {
            tags: Vec::new(),
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the source prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Append an IRCv3 tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.tags.push(Tag::new(key, value.map(str::to_owned)));
        self
    }

    /// Parameter at `index`, counting from the first one after the command.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The last parameter, usually the free-text trailing one.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// Numeric reply code, if the command is a three digit numeric.
    pub fn numeric(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }

    /// Whether the command is a numeric reply.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.numeric().is_some()
    }

    /// Value of an IRCv3 tag. Presence-only tags yield `Some("")`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|Tag(k, _)| k == key)
            .map(|Tag(_, v)| v.as_deref().unwrap_or(""))
    }

    /// The `server-time` tag, if present and well formed.
    pub fn server_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.tag("time")?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Parse the prefix as a user hostmask.
    ///
    /// Returns `None` when there is no prefix. Server names parse as a
    /// hostmask with only the nickname set.
    pub fn source(&self) -> Option<Hostmask> {
        self.prefix.as_deref().map(Hostmask::parse)
    }
}

/// An IRCv3 message tag: key and optional unescaped value.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag(
    /// Tag key (e.g., `time`, `msgid`).
    pub String,
    /// Optional tag value.
    pub Option<String>,
);

impl Tag {
    /// Create a new tag with a key and optional value.
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Tag(key.into(), value)
    }
}
