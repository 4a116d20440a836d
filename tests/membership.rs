//! Integration tests for user and channel tracking.

mod common;

use common::TestEngine;
use proptest::prelude::*;
use slirc_engine::{ErrorKind, Event, EventKind, Severity};

#[test]
fn join_names_part_quit_sequence() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":me!m@h JOIN #rust",
        ":irc.test 353 me = #rust :me @alice +bob carol",
        ":irc.test 366 me #rust :End of /NAMES list.",
        ":me!m@h JOIN #go",
        ":bob!b@h JOIN #go",
    ]);
    t.assert_consistent();

    let state = t.engine.state();
    let rust = state.channel("#rust").unwrap();
    assert_eq!(rust.member_count(), 4);
    assert!(rust.member("alice").unwrap().has_mode('o'));
    assert!(rust.member("bob").unwrap().has_mode('v'));
    assert_eq!(state.channels_of("bob"), vec!["#go".to_string(), "#rust".to_string()]);
    assert_eq!(t.count(EventKind::NamesComplete), 1);

    t.feed(&[":carol!c@h PART #rust :later"]);
    // carol shared no other channel with us.
    assert!(t.engine.state().user("carol").is_none());
    t.assert_consistent();

    t.feed(&[":bob!b@h QUIT :Quit: bye"]);
    match &t.log.of_kind(EventKind::Quit)[0] {
        Event::Quit {
            user,
            reason,
            channels,
        } => {
            assert_eq!(user.nickname, "bob");
            assert_eq!(reason.as_deref(), Some("Quit: bye"));
            assert_eq!(channels.len(), 2);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(t.engine.state().user("bob").is_none());
    assert_eq!(t.engine.state().channel("#go").unwrap().member_count(), 1);
    t.assert_consistent();
}

#[test]
fn traffic_for_channels_we_are_not_in_is_not_tracked() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":bob!b@h JOIN #elsewhere",
        ":irc.test 353 me = #other :carol dave",
    ]);

    let state = t.engine.state();
    assert!(state.channel("#elsewhere").is_none());
    assert!(state.user("bob").is_none());
    assert!(state.user("carol").is_none());
    assert!(state.channel("#other").unwrap().is_empty());
    assert_eq!(state.user_count(), 1);
    // Still reported to listeners.
    assert_eq!(t.count(EventKind::Join), 1);
    t.assert_consistent();

    assert_eq!(t.engine.collect_empty_channels(), vec!["#other".to_string()]);
}

#[test]
fn user_is_forgotten_after_last_shared_channel() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":me!m@h JOIN #a",
        ":me!m@h JOIN #b",
        ":bob!b@h JOIN #a",
        ":bob!b@h JOIN #b",
        ":me!m@h PART #b",
    ]);
    assert!(t.engine.state().user("bob").is_some());

    t.feed(&[":bob!b@h PART #a"]);
    assert!(t.engine.state().user("bob").is_none());
    t.assert_consistent();
}

#[test]
fn kick_of_local_user_drops_channel() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":me!m@h JOIN #rust",
        ":alice!a@h JOIN #rust",
        ":alice!a@h KICK #rust me :out",
    ]);

    assert!(t.engine.state().channel("#rust").is_none());
    assert!(t.engine.state().user("alice").is_none());
    assert_eq!(t.count(EventKind::Kick), 1);
    t.assert_consistent();
}

#[test]
fn kick_of_other_user_keeps_channel() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":me!m@h JOIN #rust",
        ":alice!a@h JOIN #rust",
        ":bob!b@h JOIN #rust",
        ":alice!a@h KICK #rust bob :spam",
    ]);

    let rust = t.engine.state().channel("#rust").unwrap();
    assert_eq!(rust.member_count(), 2);
    assert!(rust.member("bob").is_none());
    t.assert_consistent();
}

#[test]
fn nick_change_moves_memberships() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":me!m@h JOIN #rust",
        ":alice!a@h JOIN #rust",
        ":alice!a@h NICK :alicia",
    ]);

    let state = t.engine.state();
    assert!(state.user("alice").is_none());
    assert_eq!(state.user("alicia").unwrap().nickname(), "alicia");
    assert!(state.channel("#rust").unwrap().member("alicia").is_some());
    assert_eq!(t.count(EventKind::NickChanged), 1);
    t.assert_consistent();
}

#[test]
fn nick_collision_is_rejected() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":me!m@h JOIN #rust",
        ":alice!a@h JOIN #rust",
        ":bob!b@h JOIN #rust",
        ":bob!b@h NICK ALICE",
    ]);

    assert_eq!(t.count(EventKind::NickChanged), 0);
    let errors = t.log.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Invariant);
    assert_eq!(errors[0].severity, Severity::Fatal);
    assert!(t.engine.state().user("bob").is_some());
    t.assert_consistent();
}

#[test]
fn local_nick_change_is_followed() {
    let mut t = TestEngine::registered("me");
    t.feed(&[":me!m@h JOIN #rust", ":me!m@h NICK newme"]);

    assert_eq!(t.engine.state().local_nick(), Some("newme"));
    t.feed(&[":newme!m@h PART #rust"]);
    assert!(t.engine.state().channel("#rust").is_none());
    t.assert_consistent();
}

#[test]
fn channel_modes_and_prefixes() {
    let mut t = TestEngine::registered("me");
    t.feed(&[
        ":me!m@h JOIN #rust",
        ":alice!a@h JOIN #rust",
        ":ChanServ!s@services MODE #rust +ko-v secret alice alice",
        ":irc.test 324 me #rust +lnt 50",
    ]);

    let rust = t.engine.state().channel("#rust").unwrap();
    assert!(rust.member("alice").unwrap().has_mode('o'));
    assert!(rust.has_mode('n'));
    assert!(rust.has_mode('k'));
    assert_eq!(rust.mode_string(), "+klnt secret 50");
    assert_eq!(t.count(EventKind::ChannelModeChanged), 2);
    t.assert_consistent();
}

#[test]
fn empty_channels_are_collected_on_request() {
    let mut t = TestEngine::registered("me");
    t.feed(&[":irc.test 332 me #lurk :a topic for a channel we are not in"]);
    assert!(t.engine.state().channel("#lurk").is_some());

    assert_eq!(t.engine.collect_empty_channels(), vec!["#lurk".to_string()]);
    assert!(t.engine.state().channel("#lurk").is_none());
}

const NICKS: [&str; 4] = ["alice", "bob", "carol", "me"];
const CHANNELS: [&str; 3] = ["#a", "#b", "#c"];

fn line() -> impl Strategy<Value = String> {
    let nick = prop::sample::select(NICKS.to_vec());
    let chan = prop::sample::select(CHANNELS.to_vec());
    prop_oneof![
        (nick.clone(), chan.clone()).prop_map(|(n, c)| format!(":{n}!u@h JOIN {c}")),
        (nick.clone(), chan.clone()).prop_map(|(n, c)| format!(":{n}!u@h PART {c} :bye")),
        (nick.clone(), chan.clone(), nick.clone())
            .prop_map(|(k, c, n)| format!(":{k}!u@h KICK {c} {n} :out")),
        nick.clone().prop_map(|n| format!(":{n}!u@h QUIT :gone")),
        (nick.clone(), nick.clone()).prop_map(|(a, b)| format!(":{a}!u@h NICK {b}")),
        (chan.clone(), nick.clone())
            .prop_map(|(c, n)| format!(":irc.test 353 me = {c} :@{n} +me")),
        (chan.clone(), nick).prop_map(|(c, n)| format!(":op!o@h MODE {c} +o-v {n} {n}")),
        chan.prop_map(|c| format!(":irc.test 332 me {c} :topic")),
    ]
}

proptest! {
    #[test]
    fn arbitrary_traffic_keeps_state_consistent(lines in prop::collection::vec(line(), 0..60)) {
        let mut t = TestEngine::registered("me");
        for l in &lines {
            t.feed(&[l.as_str()]);
            if let Err(e) = t.engine.state().check_invariants() {
                return Err(TestCaseError::fail(format!("after {l:?}: {e}")));
            }
        }
        t.engine.collect_empty_channels();
        prop_assert!(t.engine.state().check_invariants().is_ok());
    }
}
