//! Engine under test.

#![allow(dead_code)]

use slirc_engine::{Engine, EngineConfig, EventKind};

use super::recorder::{EventLog, RecordingSender};

/// An engine wired to a [`RecordingSender`] with an [`EventLog`] attached
/// to every event kind.
pub struct TestEngine {
    pub engine: Engine,
    pub sent: RecordingSender,
    pub log: EventLog,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let sent = RecordingSender::default();
        let engine = Engine::new(config, sent.clone()).expect("valid config");
        let log = EventLog::default();
        log.attach_all(engine.dispatcher());
        Self { engine, sent, log }
    }

    /// An engine that has seen `001` for `nick`.
    pub fn registered(nick: &str) -> Self {
        let mut test = Self::new();
        test.feed(&[&format!(":irc.test 001 {nick} :Welcome to the test network")]);
        test.log.clear();
        test
    }

    /// Feed lines in order, ignoring decode errors (they are logged as events).
    pub fn feed(&mut self, lines: &[&str]) {
        for line in lines {
            let _ = self.engine.handle_line(line);
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.log.of_kind(kind).len()
    }

    /// Panics with the violation if the State Model is inconsistent.
    pub fn assert_consistent(&self) {
        if let Err(e) = self.engine.state().check_invariants() {
            panic!("state invariant broken: {e}");
        }
    }
}
