//! Topic processors.
//!
//! `TOPIC` from the server is a live change. `332`/`333` arrive on join or
//! after a query and only sync the stored topic; `331` says there is none.

use chrono::{DateTime, Utc};
use slirc_wire::{Hostmask, RawMessage};

use super::core::{has_params, require_source, Context, Processor};
use crate::error::ProcessResult;
use crate::event::{Event, TopicOrigin};
use crate::state::Topic;

/// Processor for `TOPIC`, `RPL_NOTOPIC` (331), `RPL_TOPIC` (332) and
/// `RPL_TOPICWHOTIME` (333).
pub struct TopicProcessor;

impl Processor for TopicProcessor {
    fn name(&self) -> &'static str {
        "topic"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["TOPIC", "331", "332", "333"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        match msg.command.as_str() {
            "331" => no_topic(ctx, msg),
            "332" => topic_reply(ctx, msg),
            "333" => topic_who_time(ctx, msg),
            _ => topic_change(ctx, msg),
        }
    }
}

/// `:nick!ident@host TOPIC <channel> :<text>`; empty text clears the topic.
fn topic_change(ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
    let setter = require_source(msg, "TOPIC")?;
    if !has_params(msg, 1) {
        return Ok(());
    }
    let channel = msg.params[0].clone();
    let text = msg.param(1).unwrap_or_default();

    let topic = Topic {
        text: text.to_owned(),
        set_by: Some(setter.nickname),
        set_at: Some(msg.server_time().unwrap_or_else(Utc::now)),
    };
    if ctx.state.channel(&channel).is_some() {
        let stored = (!text.is_empty()).then(|| topic.clone());
        ctx.state.set_topic(&channel, stored)?;
    }

    ctx.emit(Event::TopicChanged {
        channel,
        topic,
        origin: TopicOrigin::Changed,
    });
    Ok(())
}

/// `:server 331 <nick> <channel> :No topic is set`
fn no_topic(ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
    if !has_params(msg, 2) {
        return Ok(());
    }
    let channel = msg.params[1].clone();
    if ctx.state.channel(&channel).is_some() {
        ctx.state.set_topic(&channel, None)?;
    }
    ctx.emit(Event::NoTopic { channel });
    Ok(())
}

/// `:server 332 <nick> <channel> :<text>`
fn topic_reply(ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
    if !has_params(msg, 3) {
        return Ok(());
    }
    let channel = msg.params[1].clone();
    let topic = Topic::new(msg.params[2].as_str());

    ctx.state.add_channel(&channel);
    ctx.state.set_topic(&channel, Some(topic.clone()))?;

    ctx.emit(Event::TopicChanged {
        channel,
        topic,
        origin: TopicOrigin::Sync,
    });
    Ok(())
}

/// `:server 333 <nick> <channel> <setter> <unix time>`
///
/// Completes the topic stored by a preceding 332. No event.
fn topic_who_time(ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
    if !has_params(msg, 3) {
        return Ok(());
    }
    let channel = &msg.params[1];
    if ctx.state.channel(channel).is_none() {
        return Ok(());
    }
    let set_by = Hostmask::parse(&msg.params[2]).nickname;
    let set_at = msg
        .param(3)
        .and_then(|t| t.parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    ctx.state.set_topic_meta(channel, Some(set_by), set_at)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineSettings;
    use crate::dispatch::Dispatcher;
    use crate::sender::NullSender;
    use crate::state::StateModel;

    fn run(state: &mut StateModel, line: &str) {
        let dispatcher = Dispatcher::new();
        let settings = EngineSettings::default();
        let msg = slirc_wire::decode(line).unwrap();
        let mut ctx = Context {
            state,
            dispatcher: &dispatcher,
            sender: &NullSender,
            settings: &settings,
            line,
        };
        TopicProcessor.process(&mut ctx, &msg).unwrap();
    }

    #[test]
    fn sync_numerics_fill_in_topic() {
        let mut state = StateModel::default();
        run(&mut state, ":srv 332 me #rust :Rust talk");
        run(&mut state, ":srv 333 me #rust alice!a@host 1700000000");

        let topic = state.channel("#rust").unwrap().topic().unwrap();
        assert_eq!(topic.text, "Rust talk");
        assert_eq!(topic.set_by.as_deref(), Some("alice"));
        assert_eq!(topic.set_at.unwrap().timestamp(), 1_700_000_000);

        run(&mut state, ":srv 331 me #rust :No topic is set");
        assert!(state.channel("#rust").unwrap().topic().is_none());
    }

    #[test]
    fn topic_change_uses_server_time() {
        let mut state = StateModel::default();
        state.add_channel("#rust");
        run(
            &mut state,
            "@time=2024-03-01T12:00:00.000Z :bob!b@h TOPIC #rust :new topic",
        );
        let topic = state.channel("#rust").unwrap().topic().unwrap();
        assert_eq!(topic.set_by.as_deref(), Some("bob"));
        assert_eq!(topic.set_at.unwrap().to_rfc3339(), "2024-03-01T12:00:00+00:00");

        run(&mut state, ":bob!b@h TOPIC #rust :");
        assert!(state.channel("#rust").unwrap().topic().is_none());
    }
}
