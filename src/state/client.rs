//! Known users.

use std::collections::{BTreeSet, HashMap};

use slirc_wire::Hostmask;

/// One user the engine knows about.
///
/// Owned by [`StateModel`](super::StateModel); hosts only ever see shared
/// references. The channel set holds casefolded channel keys and mirrors the
/// member tables of the channels themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub(crate) mask: Hostmask,
    pub(crate) attributes: HashMap<String, String>,
    pub(crate) away: Option<String>,
    pub(crate) channels: BTreeSet<String>,
}

impl ClientInfo {
    pub(crate) fn new(mask: Hostmask) -> Self {
        Self {
            mask,
            attributes: HashMap::new(),
            away: None,
            channels: BTreeSet::new(),
        }
    }

    /// Full hostmask as last seen.
    pub fn mask(&self) -> &Hostmask {
        &self.mask
    }

    pub fn nickname(&self) -> &str {
        &self.mask.nickname
    }

    pub fn ident(&self) -> Option<&str> {
        self.mask.ident.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.mask.host.as_deref()
    }

    /// Away message, if the user is marked away.
    pub fn away(&self) -> Option<&str> {
        self.away.as_deref()
    }

    pub fn is_away(&self) -> bool {
        self.away.is_some()
    }

    /// Extension attribute such as `account` or `realname`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Keys of the channels this user is known to be in.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }

    /// Whether the user is in the channel with the given key.
    pub fn is_on(&self, channel_key: &str) -> bool {
        self.channels.contains(channel_key)
    }

    /// Merge a freshly seen hostmask. Parts the new mask lacks are kept.
    pub(crate) fn refresh(&mut self, mask: &Hostmask) {
        self.mask.nickname.clone_from(&mask.nickname);
        if mask.ident.is_some() {
            self.mask.ident.clone_from(&mask.ident);
        }
        if mask.host.is_some() {
            self.mask.host.clone_from(&mask.host);
        }
    }
}
