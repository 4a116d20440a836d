//! The closed set of semantic events the engine emits.
//!
//! Listeners register per [`EventKind`] and receive the matching [`Event`]
//! variant. Matching on `Event` is exhaustive, so adding a variant is a
//! compile error at every listener that cares.

use chrono::{DateTime, Utc};
use slirc_wire::Hostmask;

use crate::error::ErrorInfo;
use crate::state::Topic;

/// One channel mode change from a `MODE` line or `324` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeChange {
    pub adding: bool,
    pub mode: char,
    pub param: Option<String>,
}

/// How a `PRIVMSG`/`NOTICE` body was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Privmsg,
    Notice,
    /// CTCP `ACTION` (`/me`); the event text is the action body.
    Action,
    /// CTCP request carried in a `PRIVMSG`.
    Ctcp { command: String, args: Option<String> },
    /// CTCP reply carried in a `NOTICE`.
    CtcpReply { command: String, args: Option<String> },
}

/// Why a [`Event::TopicChanged`] was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicOrigin {
    /// Someone changed the topic.
    Changed,
    /// The server sent the topic while syncing channel state.
    Sync,
    /// The host asked for the stored topic.
    Query,
}

/// A semantic notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RawLineIn {
        line: String,
    },
    RawLineOut {
        line: String,
    },
    ServerReady {
        server: String,
        nickname: String,
    },
    Isupport {
        tokens: Vec<(String, Option<String>)>,
    },
    Numeric {
        numeric: u16,
        params: Vec<String>,
    },
    Ping {
        token: String,
    },
    Join {
        channel: String,
        user: Hostmask,
    },
    Part {
        channel: String,
        user: Hostmask,
        reason: Option<String>,
    },
    Kick {
        channel: String,
        kicker: Hostmask,
        kicked: String,
        reason: Option<String>,
    },
    Quit {
        user: Hostmask,
        reason: Option<String>,
        /// Channels the user shared with us, captured before removal.
        channels: Vec<String>,
    },
    NickChanged {
        user: Hostmask,
        new_nick: String,
    },
    Invite {
        inviter: Hostmask,
        channel: String,
    },
    TopicChanged {
        channel: String,
        topic: Topic,
        origin: TopicOrigin,
    },
    NoTopic {
        channel: String,
    },
    NamesComplete {
        channel: String,
    },
    ChannelModeChanged {
        channel: String,
        setter: Option<Hostmask>,
        changes: Vec<ModeChange>,
    },
    UserModeChanged {
        nickname: String,
        setter: Option<Hostmask>,
        modes: String,
    },
    Message {
        source: Hostmask,
        target: String,
        text: String,
        kind: MessageKind,
        is_channel: bool,
        time: Option<DateTime<Utc>>,
    },
    Walluser {
        source: Hostmask,
        message: String,
    },
    Wallop {
        source: Hostmask,
        message: String,
    },
    WallDesync {
        source: Hostmask,
        message: String,
    },
    AwayChanged {
        nickname: String,
        away: Option<String>,
    },
    Error(ErrorInfo),
}

/// Discriminant of [`Event`], used as the registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RawLineIn,
    RawLineOut,
    ServerReady,
    Isupport,
    Numeric,
    Ping,
    Join,
    Part,
    Kick,
    Quit,
    NickChanged,
    Invite,
    TopicChanged,
    NoTopic,
    NamesComplete,
    ChannelModeChanged,
    UserModeChanged,
    Message,
    Walluser,
    Wallop,
    WallDesync,
    AwayChanged,
    Error,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 23] = [
        EventKind::RawLineIn,
        EventKind::RawLineOut,
        EventKind::ServerReady,
        EventKind::Isupport,
        EventKind::Numeric,
        EventKind::Ping,
        EventKind::Join,
        EventKind::Part,
        EventKind::Kick,
        EventKind::Quit,
        EventKind::NickChanged,
        EventKind::Invite,
        EventKind::TopicChanged,
        EventKind::NoTopic,
        EventKind::NamesComplete,
        EventKind::ChannelModeChanged,
        EventKind::UserModeChanged,
        EventKind::Message,
        EventKind::Walluser,
        EventKind::Wallop,
        EventKind::WallDesync,
        EventKind::AwayChanged,
        EventKind::Error,
    ];
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::RawLineIn { .. } => EventKind::RawLineIn,
            Event::RawLineOut { .. } => EventKind::RawLineOut,
            Event::ServerReady { .. } => EventKind::ServerReady,
            Event::Isupport { .. } => EventKind::Isupport,
            Event::Numeric { .. } => EventKind::Numeric,
            Event::Ping { .. } => EventKind::Ping,
            Event::Join { .. } => EventKind::Join,
            Event::Part { .. } => EventKind::Part,
            Event::Kick { .. } => EventKind::Kick,
            Event::Quit { .. } => EventKind::Quit,
            Event::NickChanged { .. } => EventKind::NickChanged,
            Event::Invite { .. } => EventKind::Invite,
            Event::TopicChanged { .. } => EventKind::TopicChanged,
            Event::NoTopic { .. } => EventKind::NoTopic,
            Event::NamesComplete { .. } => EventKind::NamesComplete,
            Event::ChannelModeChanged { .. } => EventKind::ChannelModeChanged,
            Event::UserModeChanged { .. } => EventKind::UserModeChanged,
            Event::Message { .. } => EventKind::Message,
            Event::Walluser { .. } => EventKind::Walluser,
            Event::Wallop { .. } => EventKind::Wallop,
            Event::WallDesync { .. } => EventKind::WallDesync,
            Event::AwayChanged { .. } => EventKind::AwayChanged,
            Event::Error(_) => EventKind::Error,
        }
    }

    /// The user the event originates from, if it has one.
    ///
    /// This is what [`Scope::Source`](crate::dispatch::Scope::Source)
    /// matches against.
    pub fn source(&self) -> Option<&Hostmask> {
        match self {
            Event::Join { user, .. }
            | Event::Part { user, .. }
            | Event::Quit { user, .. }
            | Event::NickChanged { user, .. } => Some(user),
            Event::Kick { kicker, .. } => Some(kicker),
            Event::Invite { inviter, .. } => Some(inviter),
            Event::Message { source, .. }
            | Event::Walluser { source, .. }
            | Event::Wallop { source, .. }
            | Event::WallDesync { source, .. } => Some(source),
            Event::ChannelModeChanged { setter, .. } | Event::UserModeChanged { setter, .. } => {
                setter.as_ref()
            }
            _ => None,
        }
    }

    /// The channel the event concerns, if any.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Event::Join { channel, .. }
            | Event::Part { channel, .. }
            | Event::Kick { channel, .. }
            | Event::Invite { channel, .. }
            | Event::TopicChanged { channel, .. }
            | Event::NoTopic { channel }
            | Event::NamesComplete { channel }
            | Event::ChannelModeChanged { channel, .. } => Some(channel),
            Event::Message {
                target, is_channel, ..
            } if *is_channel => Some(target),
            _ => None,
        }
    }
}
