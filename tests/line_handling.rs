//! Integration tests for inbound line handling: decoding, routing and the
//! connection-level processors.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::TestEngine;
use slirc_engine::config::EngineConfig;
use slirc_engine::error::{ProcessResult, ProcessorError};
use slirc_engine::processors::{Context, Processor};
use slirc_engine::wire::{CaseMapping, DecodeError, RawMessage};
use slirc_engine::{ErrorKind, Event, EventKind, Severity};

#[test]
fn welcome_sets_local_user_and_reports_ready() {
    let mut t = TestEngine::new();
    t.feed(&[":irc.test 001 alice :Welcome to the test network alice!a@host"]);

    assert_eq!(t.engine.state().local_nick(), Some("alice"));
    let ready = t.log.of_kind(EventKind::ServerReady);
    assert_eq!(
        ready,
        vec![Event::ServerReady {
            server: "irc.test".into(),
            nickname: "alice".into(),
        }]
    );
    // Every numeric is also surfaced verbatim.
    assert_eq!(t.count(EventKind::Numeric), 1);
}

#[test]
fn prefixless_line_is_routed() {
    let mut t = TestEngine::new();
    t.feed(&["PING :irc.test"]);

    assert_eq!(t.sent.lines(), vec!["PONG :irc.test".to_string()]);
    assert_eq!(
        t.log.of_kind(EventKind::Ping),
        vec![Event::Ping {
            token: "irc.test".into()
        }]
    );
}

#[test]
fn auto_pong_can_be_disabled() {
    let config = EngineConfig::from_toml("[engine]\nauto_pong = false\n").unwrap();
    let mut t = TestEngine::with_config(config);
    t.feed(&["PING :abc"]);

    assert!(t.sent.lines().is_empty());
    assert_eq!(t.count(EventKind::Ping), 1);
}

#[test]
fn undecodable_line_reports_low_severity_error() {
    let mut t = TestEngine::new();
    assert_eq!(
        t.engine.handle_line(":only.a.prefix"),
        Err(DecodeError::MissingCommand)
    );

    let errors = t.log.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Decode);
    assert_eq!(errors[0].severity, Severity::Low);
    assert_eq!(errors[0].raw_line.as_deref(), Some(":only.a.prefix"));

    // The engine keeps going.
    t.feed(&["PING :still-alive"]);
    assert_eq!(t.count(EventKind::Ping), 1);
}

#[test]
fn blank_lines_are_dropped_quietly() {
    let mut t = TestEngine::new();
    assert_eq!(t.engine.handle_line("\r\n"), Err(DecodeError::Empty));
    assert!(t.log.events().is_empty());
}

#[test]
fn server_error_is_generic() {
    let mut t = TestEngine::new();
    t.feed(&["ERROR :Closing Link: 127.0.0.1 (Ping timeout)"]);

    let errors = t.log.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Generic);
    assert!(errors[0].message.contains("Ping timeout"));
}

#[test]
fn invite_is_reported() {
    let mut t = TestEngine::registered("me");
    t.feed(&[":alice!a@example.org INVITE me #rust"]);

    let invites = t.log.of_kind(EventKind::Invite);
    assert_eq!(invites.len(), 1);
    match &invites[0] {
        Event::Invite { inviter, channel } => {
            assert_eq!(inviter.nickname, "alice");
            assert_eq!(inviter.ident.as_deref(), Some("a"));
            assert_eq!(inviter.host.as_deref(), Some("example.org"));
            assert_eq!(channel, "#rust");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn malformed_invite_is_ignored() {
    let mut t = TestEngine::registered("me");
    t.feed(&[":a!b@c INVITE me"]);

    assert_eq!(t.count(EventKind::Invite), 0);
    assert!(t.log.errors().is_empty());
    t.assert_consistent();
}

#[test]
fn duplicate_invites_do_not_touch_state() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":alice!a@example.org INVITE me #rust",
        ":alice!a@example.org INVITE me #rust",
    ]);

    assert_eq!(t.count(EventKind::Invite), 2);
    assert!(t.engine.state().channel("#rust").is_none());
    assert!(t.engine.state().user("alice").is_none());
}

#[test]
fn isupport_switches_casemapping_and_rekeys() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":me!m@h JOIN #Chan[1]",
        ":bob!b@h JOIN #Chan[1]",
        ":irc.test 005 me CASEMAPPING=ascii NETWORK=TestNet PREFIX=(qaohv)~&@%+ :are supported by this server",
    ]);

    let state = t.engine.state();
    assert_eq!(state.casemap(), CaseMapping::Ascii);
    assert_eq!(state.network(), Some("TestNet"));
    assert!(state.prefix().is_prefix_mode('q'));
    // Under ascii, '[' and '{' are distinct.
    assert!(state.channel("#chan[1]").is_some());
    assert!(state.channel("#chan{1}").is_none());
    assert_eq!(t.count(EventKind::Isupport), 1);
    t.assert_consistent();
}

#[test]
fn unknown_casemapping_token_keeps_current_mapping() {
    let mut t = TestEngine::registered("me");
    t.feed(&[":irc.test 005 me CASEMAPPING=rfc7613 NETWORK=TestNet :are supported by this server"]);

    let state = t.engine.state();
    assert_eq!(state.casemap(), CaseMapping::StrictRfc1459);
    assert_eq!(state.network(), Some("TestNet"));
    assert!(t.log.errors().is_empty());
}

#[test]
fn raw_line_events_when_enabled() {
    let config = EngineConfig::from_toml("[engine]\nemit_raw_lines = true\n").unwrap();
    let mut t = TestEngine::with_config(config);
    t.feed(&["PING :x\r\n"]);

    assert_eq!(
        t.log.of_kind(EventKind::RawLineIn),
        vec![Event::RawLineIn {
            line: "PING :x".into()
        }]
    );
    assert_eq!(
        t.log.of_kind(EventKind::RawLineOut),
        vec![Event::RawLineOut {
            line: "PONG :x".into()
        }]
    );
}

#[test]
fn registration_uses_configured_identity() {
    let config = EngineConfig::from_toml(
        "[identity]\nnickname = \"rusty\"\nusername = \"crab\"\nrealname = \"Rusty Crab\"\n",
    )
    .unwrap();
    let t = TestEngine::with_config(config);
    t.engine.send_registration().unwrap();

    assert_eq!(
        t.sent.lines(),
        vec![
            "NICK rusty".to_string(),
            "USER crab 0 * :Rusty Crab".to_string(),
        ]
    );
}

#[test]
fn decoded_fields_reach_numeric_event() {
    let mut t = TestEngine::new();
    t.feed(&[":irc.test 372 me :- Message   of the day -"]);

    assert_eq!(
        t.log.of_kind(EventKind::Numeric),
        vec![Event::Numeric {
            numeric: 372,
            params: vec!["me".into(), "- Message   of the day -".into()],
        }]
    );
}

struct Exploding;

impl Processor for Exploding {
    fn name(&self) -> &'static str {
        "exploding"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["XTEST"]
    }

    fn process(&self, _ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        if msg.params.is_empty() {
            panic!("no params");
        }
        Err(ProcessorError::InvalidParam {
            what: "xtest",
            value: msg.params[0].clone(),
        })
    }
}

struct Counting(Arc<AtomicUsize>);

impl Processor for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["XTEST"]
    }

    fn process(&self, _ctx: &mut Context<'_>, _msg: &RawMessage) -> ProcessResult {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn failing_processor_does_not_stop_the_next_one() {
    let mut t = TestEngine::new();
    let runs = Arc::new(AtomicUsize::new(0));
    t.engine.processors_mut().register_processor(Exploding);
    t.engine
        .processors_mut()
        .register_processor(Counting(runs.clone()));

    t.feed(&["XTEST bad", "XTEST"]);

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    let errors = t.log.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.kind == ErrorKind::Processor));
    assert_eq!(errors[0].raw_line.as_deref(), Some("XTEST bad"));
    assert!(errors[1].message.contains("no params"));
}

#[test]
fn unknown_commands_are_ignored() {
    let mut t = TestEngine::registered("me");
    t.feed(&[":irc.test FROBNICATE a b :c"]);
    assert!(t.log.events().is_empty());
}
