//! PRIVMSG, NOTICE and WALLOPS.

use slirc_wire::{Hostmask, RawMessage};

use super::core::{has_params, require_source, Context, Processor};
use crate::error::ProcessResult;
use crate::event::{Event, MessageKind};

const CTCP_DELIM: char = '\x01';

/// Classify a message body as plain text, ACTION or CTCP.
///
/// Returns the kind and the text to report: the body for plain messages,
/// the CTCP arguments otherwise.
fn classify(text: &str, notice: bool) -> (MessageKind, String) {
    let Some(inner) = text.strip_prefix(CTCP_DELIM) else {
        let kind = if notice {
            MessageKind::Notice
        } else {
            MessageKind::Privmsg
        };
        return (kind, text.to_owned());
    };
    let inner = inner.strip_suffix(CTCP_DELIM).unwrap_or(inner);
    let (command, args) = match inner.split_once(' ') {
        Some((command, args)) => (command, Some(args.to_owned())),
        None => (inner, None),
    };
    let command = command.to_ascii_uppercase();

    if !notice && command == "ACTION" {
        return (MessageKind::Action, args.unwrap_or_default());
    }
    let body = args.clone().unwrap_or_default();
    let kind = if notice {
        MessageKind::CtcpReply { command, args }
    } else {
        MessageKind::Ctcp { command, args }
    };
    (kind, body)
}

/// Processor for `PRIVMSG` and `NOTICE`.
///
/// `:nick!ident@host PRIVMSG <target> :<text>`
///
/// Prefixless notices (sent by some servers before registration) get an
/// empty source.
pub struct MessageProcessor;

impl Processor for MessageProcessor {
    fn name(&self) -> &'static str {
        "message"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["PRIVMSG", "NOTICE"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        if !has_params(msg, 2) {
            return Ok(());
        }
        let notice = msg.command.eq_ignore_ascii_case("NOTICE");
        let source = if notice {
            msg.source().unwrap_or_default()
        } else {
            require_source(msg, "PRIVMSG")?
        };
        let target = msg.params[0].clone();
        let (kind, text) = classify(&msg.params[1], notice);

        // STATUSMSG targets such as `@#chan` still address the channel
        let (_, bare) = ctx.state.prefix().strip_symbols(&target);
        let is_channel = ctx.state.is_channel_name(bare);

        ctx.emit(Event::Message {
            source,
            target,
            text,
            kind,
            is_channel,
            time: msg.server_time(),
        });
        Ok(())
    }
}

/// Processor for `WALLOPS`.
///
/// A leading `*` marks an operator wallop, `$` a desync notice; anything
/// else is a user wallop.
pub struct WallopsProcessor;

impl Processor for WallopsProcessor {
    fn name(&self) -> &'static str {
        "wallops"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["WALLOPS"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let source: Hostmask = require_source(msg, "WALLOPS")?;
        if !has_params(msg, 1) {
            return Ok(());
        }
        let text = &msg.params[0];

        let event = if let Some(rest) = text.strip_prefix('*') {
            Event::Wallop {
                source,
                message: rest.trim_start().to_owned(),
            }
        } else if let Some(rest) = text.strip_prefix('$') {
            Event::WallDesync {
                source,
                message: rest.trim_start().to_owned(),
            }
        } else {
            Event::Walluser {
                source,
                message: text.clone(),
            }
        };
        ctx.emit(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text() {
        assert_eq!(classify("hello", false), (MessageKind::Privmsg, "hello".into()));
        assert_eq!(classify("hello", true), (MessageKind::Notice, "hello".into()));
    }

    #[test]
    fn action() {
        assert_eq!(
            classify("\x01ACTION waves\x01", false),
            (MessageKind::Action, "waves".into())
        );
    }

    #[test]
    fn ctcp_request_and_reply() {
        assert_eq!(
            classify("\x01version\x01", false),
            (
                MessageKind::Ctcp {
                    command: "VERSION".into(),
                    args: None
                },
                String::new()
            )
        );
        assert_eq!(
            classify("\x01PING 12345", true),
            (
                MessageKind::CtcpReply {
                    command: "PING".into(),
                    args: Some("12345".into())
                },
                "12345".into()
            )
        );
    }
}
