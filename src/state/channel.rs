//! Channel-related types and state.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use slirc_wire::PrefixSpec;

/// Channel topic with metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub text: String,
    pub set_by: Option<String>,
    pub set_at: Option<DateTime<Utc>>,
}

impl Topic {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            set_by: None,
            set_at: None,
        }
    }
}

/// An entry in a list mode (bans, excepts, invex).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub mask: String,
    pub set_by: Option<String>,
    pub set_at: Option<DateTime<Utc>>,
}

/// A user's membership in one channel.
///
/// Refers to the client and the channel by key only; neither side owns
/// the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelClientInfo {
    pub(crate) client_key: String,
    pub(crate) channel_key: String,
    /// Membership mode letters, most privileged first.
    pub(crate) modes: String,
}

impl ChannelClientInfo {
    pub(crate) fn new(client_key: String, channel_key: String) -> Self {
        Self {
            client_key,
            channel_key,
            modes: String::new(),
        }
    }

    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    pub fn channel_key(&self) -> &str {
        &self.channel_key
    }

    /// Membership modes such as `ov`, highest rank first.
    pub fn modes(&self) -> &str {
        &self.modes
    }

    pub fn has_mode(&self, mode: char) -> bool {
        self.modes.contains(mode)
    }

    /// Display symbol of the highest membership mode, e.g. `@`.
    pub fn highest_symbol(&self, prefix: &PrefixSpec) -> Option<char> {
        self.modes
            .chars()
            .next()
            .and_then(|m| prefix.symbol_for_mode(m))
    }

    /// Add or remove a membership mode. Returns whether anything changed.
    pub(crate) fn apply_mode(&mut self, mode: char, adding: bool, prefix: &PrefixSpec) -> bool {
        if adding == self.has_mode(mode) {
            return false;
        }
        if adding {
            self.modes.push(mode);
            let mut chars: Vec<char> = self.modes.chars().collect();
            chars.sort_by_key(|m| prefix.rank(*m).unwrap_or(usize::MAX));
            self.modes = chars.into_iter().collect();
        } else {
            self.modes.retain(|m| m != mode);
        }
        true
    }
}

/// One channel the engine knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub(crate) name: String,
    pub(crate) topic: Option<Topic>,
    pub(crate) modes: BTreeMap<char, Option<String>>,
    pub(crate) lists: BTreeMap<char, Vec<ListEntry>>,
    pub(crate) members: HashMap<String, ChannelClientInfo>,
}

impl ChannelInfo {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topic: None,
            modes: BTreeMap::new(),
            lists: BTreeMap::new(),
            members: HashMap::new(),
        }
    }

    /// Channel name as the server spelled it on first mention.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    /// Set channel modes and their parameters, e.g. `k` to `Some("secret")`.
    pub fn modes(&self) -> &BTreeMap<char, Option<String>> {
        &self.modes
    }

    pub fn has_mode(&self, mode: char) -> bool {
        self.modes.contains_key(&mode)
    }

    /// Entries of a list mode such as `b`.
    pub fn list(&self, mode: char) -> &[ListEntry] {
        self.lists.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Membership by client key.
    pub fn member(&self, client_key: &str) -> Option<&ChannelClientInfo> {
        self.members.get(client_key)
    }

    pub fn members(&self) -> impl Iterator<Item = &ChannelClientInfo> {
        self.members.values()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Mode string like `+knt secret` for display.
    pub fn mode_string(&self) -> String {
        let mut flags = String::from("+");
        let mut args = Vec::new();
        for (mode, param) in &self.modes {
            flags.push(*mode);
            if let Some(param) = param {
                args.push(param.as_str());
            }
        }
        if args.is_empty() {
            flags
        } else {
            format!("{} {}", flags, args.join(" "))
        }
    }
}
