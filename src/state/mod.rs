//! Live model of the users, channels and memberships seen on one connection.
//!
//! All lookups go through keys casefolded with the server's declared
//! [`CaseMapping`]. Memberships are stored on both sides (the channel's
//! member table and the user's channel set); every mutator updates both
//! before returning, and a mutation that would break that or the nickname
//! uniqueness rule is rejected with a [`StateError`] and leaves the model
//! untouched.
//!
//! Mutation is crate-private: only processors change the model. Listeners
//! get a shared reference.

mod channel;
mod client;

use std::collections::HashMap;

use slirc_wire::{CaseMapping, ChanModes, Hostmask, PrefixSpec};
use tracing::{debug, trace};

use crate::error::StateError;

pub use channel::{ChannelClientInfo, ChannelInfo, ListEntry, Topic};
pub use client::ClientInfo;

const DEFAULT_CHANTYPES: &str = "#&";

/// The State Model.
#[derive(Debug, Clone)]
pub struct StateModel {
    casemap: CaseMapping,
    prefix: PrefixSpec,
    chanmodes: ChanModes,
    chantypes: String,
    network: Option<String>,
    local_key: Option<String>,
    clients: HashMap<String, ClientInfo>,
    channels: HashMap<String, ChannelInfo>,
}

impl Default for StateModel {
    fn default() -> Self {
        Self::new(CaseMapping::default())
    }
}

impl StateModel {
    pub fn new(casemap: CaseMapping) -> Self {
        Self {
            casemap,
            prefix: PrefixSpec::default(),
            chanmodes: ChanModes::default(),
            chantypes: DEFAULT_CHANTYPES.to_owned(),
            network: None,
            local_key: None,
            clients: HashMap::new(),
            channels: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn casemap(&self) -> CaseMapping {
        self.casemap
    }

    /// Lookup key for a nickname or channel name.
    pub fn key(&self, name: &str) -> String {
        self.casemap.fold(name)
    }

    pub fn prefix(&self) -> &PrefixSpec {
        &self.prefix
    }

    pub fn chanmodes(&self) -> &ChanModes {
        &self.chanmodes
    }

    pub fn chantypes(&self) -> &str {
        &self.chantypes
    }

    pub fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }

    /// Whether `name` starts with one of the server's channel type prefixes.
    pub fn is_channel_name(&self, name: &str) -> bool {
        name.chars()
            .next()
            .is_some_and(|c| self.chantypes.contains(c))
    }

    /// Our own nickname, once the server has told us.
    pub fn local_nick(&self) -> Option<&str> {
        self.local_user().map(ClientInfo::nickname)
    }

    pub fn local_user(&self) -> Option<&ClientInfo> {
        self.local_key.as_ref().and_then(|k| self.clients.get(k))
    }

    /// Whether `nick` is us.
    pub fn is_local(&self, nick: &str) -> bool {
        self.local_key
            .as_deref()
            .is_some_and(|k| k == self.key(nick))
    }

    /// Whether we are a member of `channel`.
    pub fn is_local_member(&self, channel: &str) -> bool {
        let (Some(local), Some(chan)) = (self.local_key.as_deref(), self.channel(channel)) else {
            return false;
        };
        chan.members.contains_key(local)
    }

    pub fn user(&self, nick: &str) -> Option<&ClientInfo> {
        self.clients.get(&self.key(nick))
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelInfo> {
        self.channels.get(&self.key(name))
    }

    /// Membership of `nick` in `channel`.
    pub fn membership(&self, channel: &str, nick: &str) -> Option<&ChannelClientInfo> {
        self.channel(channel)?.member(&self.key(nick))
    }

    pub fn users(&self) -> impl Iterator<Item = &ClientInfo> {
        self.clients.values()
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelInfo> {
        self.channels.values()
    }

    pub fn user_count(&self) -> usize {
        self.clients.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Display names of the channels `nick` is in, sorted by key.
    pub fn channels_of(&self, nick: &str) -> Vec<String> {
        self.user(nick)
            .map(|client| {
                client
                    .channels
                    .iter()
                    .filter_map(|k| self.channels.get(k))
                    .map(|c| c.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Server dialect
    // ------------------------------------------------------------------

    /// Switch casemapping, re-keying every user and channel.
    ///
    /// If two live names would fold to the same key under the new mapping
    /// the switch is refused and the old mapping stays in force.
    pub(crate) fn set_casemapping(&mut self, casemap: CaseMapping) -> Result<(), StateError> {
        if casemap == self.casemap {
            return Ok(());
        }

        let rekey = |old: &str, names: &HashMap<String, String>| -> String {
            names.get(old).cloned().unwrap_or_else(|| old.to_owned())
        };

        let mut client_keys = HashMap::with_capacity(self.clients.len());
        for (old, client) in &self.clients {
            let new = casemap.fold(client.nickname());
            if client_keys.values().any(|k| *k == new) {
                return Err(StateError::CaseMappingCollision { key: new, mapping: casemap });
            }
            client_keys.insert(old.clone(), new);
        }
        let mut channel_keys = HashMap::with_capacity(self.channels.len());
        for (old, channel) in &self.channels {
            let new = casemap.fold(&channel.name);
            if channel_keys.values().any(|k| *k == new) {
                return Err(StateError::CaseMappingCollision { key: new, mapping: casemap });
            }
            channel_keys.insert(old.clone(), new);
        }

        let clients = std::mem::take(&mut self.clients);
        self.clients = clients
            .into_iter()
            .map(|(old, mut client)| {
                client.channels = client
                    .channels
                    .iter()
                    .map(|c| rekey(c, &channel_keys))
                    .collect();
                (rekey(&old, &client_keys), client)
            })
            .collect();

        let channels = std::mem::take(&mut self.channels);
        self.channels = channels
            .into_iter()
            .map(|(old, mut channel)| {
                let new_key = rekey(&old, &channel_keys);
                channel.members = std::mem::take(&mut channel.members)
                    .into_values()
                    .map(|mut member| {
                        member.client_key = rekey(&member.client_key, &client_keys);
                        member.channel_key.clone_from(&new_key);
                        (member.client_key.clone(), member)
                    })
                    .collect();
                (new_key, channel)
            })
            .collect();

        self.local_key = self.local_key.as_deref().map(|k| rekey(k, &client_keys));
        self.casemap = casemap;
        debug!(casemapping = %casemap, "casemapping changed");
        Ok(())
    }

    pub(crate) fn set_prefix(&mut self, prefix: PrefixSpec) {
        self.prefix = prefix;
    }

    pub(crate) fn set_chanmodes(&mut self, chanmodes: ChanModes) {
        self.chanmodes = chanmodes;
    }

    pub(crate) fn set_chantypes(&mut self, chantypes: &str) {
        self.chantypes = chantypes.to_owned();
    }

    pub(crate) fn set_network(&mut self, network: &str) {
        self.network = Some(network.to_owned());
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Record a user, refreshing ident/host if already known.
    pub(crate) fn add_user(&mut self, mask: &Hostmask) -> String {
        let key = self.key(&mask.nickname);
        self.clients
            .entry(key.clone())
            .and_modify(|c| c.refresh(mask))
            .or_insert_with(|| {
                trace!(nick = %mask.nickname, "new user");
                ClientInfo::new(mask.clone())
            });
        key
    }

    /// Mark `mask` as the local user. The local user is never pruned.
    pub(crate) fn set_local_user(&mut self, mask: &Hostmask) {
        let key = self.add_user(mask);
        self.local_key = Some(key);
    }

    /// Change a nickname, keeping all memberships.
    pub(crate) fn rename_user(&mut self, old: &str, new: &str) -> Result<(), StateError> {
        let old_key = self.key(old);
        let new_key = self.key(new);
        if !self.clients.contains_key(&old_key) {
            return Err(StateError::UnknownUser(old.to_owned()));
        }
        if old_key != new_key {
            if let Some(existing) = self.clients.get(&new_key) {
                return Err(StateError::NickCollision {
                    nick: new.to_owned(),
                    existing: existing.nickname().to_owned(),
                });
            }
        }

        let Some(mut client) = self.clients.remove(&old_key) else {
            return Err(StateError::UnknownUser(old.to_owned()));
        };
        client.mask.nickname = new.to_owned();

        if old_key != new_key {
            for chan_key in &client.channels {
                if let Some(channel) = self.channels.get_mut(chan_key) {
                    if let Some(mut member) = channel.members.remove(&old_key) {
                        member.client_key.clone_from(&new_key);
                        channel.members.insert(new_key.clone(), member);
                    }
                }
            }
            if self.local_key.as_deref() == Some(old_key.as_str()) {
                self.local_key = Some(new_key.clone());
            }
        }
        self.clients.insert(new_key, client);
        Ok(())
    }

    /// Forget a user and every membership it holds.
    pub(crate) fn remove_user(&mut self, nick: &str) -> Result<ClientInfo, StateError> {
        let key = self.key(nick);
        let client = self
            .clients
            .remove(&key)
            .ok_or_else(|| StateError::UnknownUser(nick.to_owned()))?;
        for chan_key in &client.channels {
            if let Some(channel) = self.channels.get_mut(chan_key) {
                channel.members.remove(&key);
            }
        }
        if self.local_key.as_deref() == Some(key.as_str()) {
            self.local_key = None;
        }
        Ok(client)
    }

    pub(crate) fn set_away(&mut self, nick: &str, away: Option<String>) -> Result<(), StateError> {
        let key = self.key(nick);
        let client = self
            .clients
            .get_mut(&key)
            .ok_or_else(|| StateError::UnknownUser(nick.to_owned()))?;
        client.away = away;
        Ok(())
    }

    pub(crate) fn set_user_attribute(
        &mut self,
        nick: &str,
        attr: &str,
        value: Option<String>,
    ) -> Result<(), StateError> {
        let key = self.key(nick);
        let client = self
            .clients
            .get_mut(&key)
            .ok_or_else(|| StateError::UnknownUser(nick.to_owned()))?;
        match value {
            Some(value) => {
                client.attributes.insert(attr.to_owned(), value);
            }
            None => {
                client.attributes.remove(attr);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Channels
    // ------------------------------------------------------------------

    /// Record a channel. Idempotent.
    pub(crate) fn add_channel(&mut self, name: &str) -> String {
        let key = self.key(name);
        self.channels.entry(key.clone()).or_insert_with(|| {
            trace!(channel = %name, "new channel");
            ChannelInfo::new(name)
        });
        key
    }

    /// Forget a channel and all memberships in it.
    ///
    /// Users left with no shared channel are forgotten too, except the
    /// local user.
    pub(crate) fn remove_channel(&mut self, name: &str) -> Result<ChannelInfo, StateError> {
        let key = self.key(name);
        let channel = self
            .channels
            .remove(&key)
            .ok_or_else(|| StateError::UnknownChannel(name.to_owned()))?;
        for client_key in channel.members.keys() {
            if let Some(client) = self.clients.get_mut(client_key) {
                client.channels.remove(&key);
            }
            self.prune_client(client_key);
        }
        Ok(channel)
    }

    pub(crate) fn set_topic(&mut self, channel: &str, topic: Option<Topic>) -> Result<(), StateError> {
        let chan = self.channel_mut(channel)?;
        chan.topic = topic;
        Ok(())
    }

    /// Update setter and time of the stored topic, if there is one.
    pub(crate) fn set_topic_meta(
        &mut self,
        channel: &str,
        set_by: Option<String>,
        set_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Option<&Topic>, StateError> {
        let chan = self.channel_mut(channel)?;
        if let Some(topic) = chan.topic.as_mut() {
            topic.set_by = set_by;
            topic.set_at = set_at;
        }
        Ok(chan.topic.as_ref())
    }

    /// Set or clear a non-list channel mode.
    pub(crate) fn set_channel_mode(
        &mut self,
        channel: &str,
        mode: char,
        adding: bool,
        param: Option<String>,
    ) -> Result<(), StateError> {
        let chan = self.channel_mut(channel)?;
        if adding {
            chan.modes.insert(mode, param);
        } else {
            chan.modes.remove(&mode);
        }
        Ok(())
    }

    /// Add or remove a list-mode entry. Returns whether the list changed.
    pub(crate) fn update_list(
        &mut self,
        channel: &str,
        mode: char,
        adding: bool,
        entry: ListEntry,
    ) -> Result<bool, StateError> {
        let casemap = self.casemap;
        let chan = self.channel_mut(channel)?;
        let list = chan.lists.entry(mode).or_default();
        let pos = list.iter().position(|e| casemap.eq(&e.mask, &entry.mask));
        let changed = match (adding, pos) {
            (true, None) => {
                list.push(entry);
                true
            }
            (false, Some(i)) => {
                list.remove(i);
                true
            }
            _ => false,
        };
        if list.is_empty() {
            chan.lists.remove(&mode);
        }
        Ok(changed)
    }

    /// Remove channels without members and return their names.
    ///
    /// Empty channels are never dropped implicitly; this is the only
    /// collection path.
    pub fn collect_empty_channels(&mut self) -> Vec<String> {
        let empty: Vec<String> = self
            .channels
            .iter()
            .filter(|(_, c)| c.is_empty())
            .map(|(k, _)| k.clone())
            .collect();
        empty
            .into_iter()
            .filter_map(|k| self.channels.remove(&k))
            .map(|c| c.name)
            .collect()
    }

    // ------------------------------------------------------------------
    // Memberships
    // ------------------------------------------------------------------

    /// Put a user in a channel, creating the user if needed.
    ///
    /// Membership modes are merged into an existing membership.
    pub(crate) fn add_membership(
        &mut self,
        channel: &str,
        mask: &Hostmask,
        modes: &[char],
    ) -> Result<(), StateError> {
        let chan_key = self.key(channel);
        if !self.channels.contains_key(&chan_key) {
            return Err(StateError::UnknownChannel(channel.to_owned()));
        }
        let client_key = self.add_user(mask);
        let prefix = &self.prefix;

        if let Some(chan) = self.channels.get_mut(&chan_key) {
            let member = chan
                .members
                .entry(client_key.clone())
                .or_insert_with(|| ChannelClientInfo::new(client_key.clone(), chan_key.clone()));
            for mode in modes {
                member.apply_mode(*mode, true, prefix);
            }
        }
        if let Some(client) = self.clients.get_mut(&client_key) {
            client.channels.insert(chan_key);
        }
        Ok(())
    }

    /// Take a user out of a channel. Returns whether they were in it.
    ///
    /// A user left with no shared channel is forgotten, unless it is us.
    pub(crate) fn remove_membership(&mut self, channel: &str, nick: &str) -> Result<bool, StateError> {
        let chan_key = self.key(channel);
        let client_key = self.key(nick);
        let chan = self
            .channels
            .get_mut(&chan_key)
            .ok_or_else(|| StateError::UnknownChannel(channel.to_owned()))?;
        let removed = chan.members.remove(&client_key).is_some();
        if let Some(client) = self.clients.get_mut(&client_key) {
            client.channels.remove(&chan_key);
        }
        self.prune_client(&client_key);
        Ok(removed)
    }

    /// Add or remove a membership mode such as `o`.
    pub(crate) fn set_member_mode(
        &mut self,
        channel: &str,
        nick: &str,
        mode: char,
        adding: bool,
    ) -> Result<bool, StateError> {
        let client_key = self.key(nick);
        let prefix = self.prefix.clone();
        let chan = self.channel_mut(channel)?;
        let member = chan
            .members
            .get_mut(&client_key)
            .ok_or_else(|| StateError::UnknownUser(nick.to_owned()))?;
        Ok(member.apply_mode(mode, adding, &prefix))
    }

    // ------------------------------------------------------------------
    // Consistency
    // ------------------------------------------------------------------

    /// Verify nickname uniqueness and two-sided membership bookkeeping.
    pub fn check_invariants(&self) -> Result<(), StateError> {
        for (key, client) in &self.clients {
            if *key != self.key(client.nickname()) {
                return Err(StateError::Inconsistent(format!(
                    "user {} stored under key {}",
                    client.nickname(),
                    key
                )));
            }
            for chan_key in &client.channels {
                let member = self
                    .channels
                    .get(chan_key)
                    .and_then(|c| c.members.get(key));
                if member.is_none() {
                    return Err(StateError::Inconsistent(format!(
                        "{} lists {} but the channel has no such member",
                        client.nickname(),
                        chan_key
                    )));
                }
            }
        }

        for (chan_key, channel) in &self.channels {
            if *chan_key != self.key(&channel.name) {
                return Err(StateError::Inconsistent(format!(
                    "channel {} stored under key {}",
                    channel.name, chan_key
                )));
            }
            for (client_key, member) in &channel.members {
                if member.client_key != *client_key || member.channel_key != *chan_key {
                    return Err(StateError::Inconsistent(format!(
                        "membership {}/{} filed under {}/{}",
                        member.channel_key, member.client_key, chan_key, client_key
                    )));
                }
                let mirrored = self
                    .clients
                    .get(client_key)
                    .is_some_and(|c| c.channels.contains(chan_key));
                if !mirrored {
                    return Err(StateError::Inconsistent(format!(
                        "{} has member {} that does not list it",
                        channel.name, client_key
                    )));
                }
            }
        }

        if let Some(local) = &self.local_key {
            if !self.clients.contains_key(local) {
                return Err(StateError::Inconsistent(format!(
                    "local user {local} is not tracked"
                )));
            }
        }
        Ok(())
    }

    fn channel_mut(&mut self, name: &str) -> Result<&mut ChannelInfo, StateError> {
        let key = self.key(name);
        self.channels
            .get_mut(&key)
            .ok_or_else(|| StateError::UnknownChannel(name.to_owned()))
    }

    /// Forget a user that no longer shares a channel with us. Without a
    /// local user, only users left in no channel at all are forgotten.
    fn prune_client(&mut self, client_key: &str) {
        if self.local_key.as_deref() == Some(client_key) {
            return;
        }
        let Some(client) = self.clients.get(client_key) else {
            return;
        };
        let shared = match self.local_key.as_deref() {
            Some(local) => client.channels.iter().any(|chan_key| {
                self.channels
                    .get(chan_key)
                    .is_some_and(|c| c.members.contains_key(local))
            }),
            None => !client.channels.is_empty(),
        };
        if shared {
            return;
        }

        trace!(key = %client_key, "forgetting user with no shared channels");
        if let Some(client) = self.clients.remove(client_key) {
            for chan_key in &client.channels {
                if let Some(chan) = self.channels.get_mut(chan_key) {
                    chan.members.remove(client_key);
                }
            }
        }
    }
}
