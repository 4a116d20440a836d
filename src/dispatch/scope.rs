//! Per-listener delivery filters.

use std::fmt;
use std::sync::Arc;

use slirc_wire::CaseMapping;

use crate::event::Event;

type Predicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Gate evaluated per listener before each invocation.
#[derive(Clone, Default)]
pub enum Scope {
    /// Every event of the registered kind.
    #[default]
    Any,
    /// Events whose source matches a wildcard hostmask such as `*!*@*.example.org`.
    Source(String),
    /// Events concerning one channel.
    Channel(String),
    /// Arbitrary predicate.
    Custom(Predicate),
}

impl Scope {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Scope::Custom(Arc::new(f))
    }

    /// Whether a listener with this scope should see `event`.
    pub fn admits(&self, event: &Event, casemap: CaseMapping) -> bool {
        match self {
            Scope::Any => true,
            Scope::Source(mask) => event.source().is_some_and(|s| s.matches(mask, casemap)),
            Scope::Channel(name) => event.channel().is_some_and(|c| casemap.eq(c, name)),
            Scope::Custom(pred) => pred(event),
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Any => f.write_str("Any"),
            Scope::Source(mask) => f.debug_tuple("Source").field(mask).finish(),
            Scope::Channel(name) => f.debug_tuple("Channel").field(name).finish(),
            Scope::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slirc_wire::Hostmask;

    fn join(nick: &str, channel: &str) -> Event {
        Event::Join {
            channel: channel.into(),
            user: Hostmask::parse(nick),
        }
    }

    #[test]
    fn source_scope_uses_wildcards_and_casemap() {
        let scope = Scope::Source("Alice!*@*".into());
        let map = CaseMapping::default();
        assert!(scope.admits(&join("alice!a@host", "#c"), map));
        assert!(!scope.admits(&join("bob!b@host", "#c"), map));
        assert!(!scope.admits(&Event::Ping { token: "x".into() }, map));
    }

    #[test]
    fn channel_scope_folds_names() {
        let scope = Scope::Channel("#Chan[1]".into());
        assert!(scope.admits(&join("a!b@c", "#chan{1}"), CaseMapping::StrictRfc1459));
        assert!(!scope.admits(&join("a!b@c", "#chan{1}"), CaseMapping::Ascii));
    }

    #[test]
    fn custom_scope() {
        let scope = Scope::custom(|e| matches!(e, Event::Join { channel, .. } if channel.len() > 3));
        assert!(scope.admits(&join("a", "#long"), CaseMapping::Ascii));
        assert!(!scope.admits(&join("a", "#s"), CaseMapping::Ascii));
        assert_eq!(format!("{scope:?}"), "Custom(..)");
    }
}
