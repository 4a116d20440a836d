//! Connection-level processors: welcome, ISUPPORT, PING, ERROR, NICK, QUIT.

use slirc_wire::{Hostmask, Isupport, RawMessage};
use tracing::debug;

use super::core::{has_params, require_source, Context, Processor};
use crate::error::{ErrorInfo, ProcessResult};
use crate::event::Event;

/// Processor for `RPL_WELCOME` (001).
///
/// `:server 001 <nick> :Welcome ...`
///
/// Records the local nickname; the local user is never pruned from state.
pub struct WelcomeProcessor;

impl Processor for WelcomeProcessor {
    fn name(&self) -> &'static str {
        "welcome"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["001"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        if !has_params(msg, 1) {
            return Ok(());
        }
        let nickname = msg.params[0].clone();
        ctx.state.set_local_user(&Hostmask::from_nick(&nickname));
        ctx.emit(Event::ServerReady {
            server: msg.prefix.clone().unwrap_or_default(),
            nickname,
        });
        Ok(())
    }
}

/// Processor for `RPL_ISUPPORT` (005).
///
/// `:server 005 <nick> TOKEN[=VALUE]... :are supported by this server`
pub struct IsupportProcessor;

impl Processor for IsupportProcessor {
    fn name(&self) -> &'static str {
        "isupport"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["005"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let isupport = Isupport::from_params(&msg.params);

        if let Some(prefix) = isupport.prefix() {
            ctx.state.set_prefix(prefix);
        }
        if let Some(chanmodes) = isupport.chanmodes() {
            ctx.state.set_chanmodes(chanmodes);
        }
        if let Some(chantypes) = isupport.chantypes() {
            ctx.state.set_chantypes(chantypes);
        }
        if let Some(network) = isupport.network() {
            ctx.state.set_network(network);
        }

        // The mapping switch can be refused; the other tokens still apply.
        let remap = match isupport.casemapping() {
            Some(casemap) => ctx.state.set_casemapping(casemap),
            None => {
                if let Some(token) = isupport.get("CASEMAPPING").flatten() {
                    debug!(casemapping = %token, "unknown casemapping ignored");
                }
                Ok(())
            }
        };

        let tokens = isupport
            .iter()
            .map(|e| (e.key.to_owned(), e.value.map(str::to_owned)))
            .collect();
        ctx.emit(Event::Isupport { tokens });

        remap?;
        Ok(())
    }
}

/// Processor for `PING`.
///
/// Answers with `PONG :<token>` unless automatic replies are disabled.
pub struct PingProcessor;

impl Processor for PingProcessor {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["PING"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let token = msg.trailing().unwrap_or_default().to_owned();
        if ctx.settings.auto_pong {
            // Transport failures are logged by send_raw; nothing else to do.
            let _ = ctx.send_raw(format!("PONG :{token}"));
        }
        ctx.emit(Event::Ping { token });
        Ok(())
    }
}

/// Processor for `ERROR`, the server's last words before closing the link.
pub struct ErrorProcessor;

impl Processor for ErrorProcessor {
    fn name(&self) -> &'static str {
        "error"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["ERROR"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let text = msg.trailing().unwrap_or("server error");
        ctx.emit(Event::Error(ErrorInfo::generic(text, Some(ctx.line.to_owned()))));
        Ok(())
    }
}

/// Processor for `NICK`.
///
/// `:old!ident@host NICK <new>`
pub struct NickProcessor;

impl Processor for NickProcessor {
    fn name(&self) -> &'static str {
        "nick"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["NICK"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let user = require_source(msg, "NICK")?;
        if !has_params(msg, 1) {
            return Ok(());
        }
        let new_nick = msg.params[0].clone();

        if ctx.state.user(&user.nickname).is_some() {
            ctx.state.rename_user(&user.nickname, &new_nick)?;
        } else {
            debug!(nick = %user.nickname, "nick change for untracked user");
        }

        ctx.emit(Event::NickChanged { user, new_nick });
        Ok(())
    }
}

/// Processor for `QUIT`.
///
/// The event carries the channels the user shared with us, captured before
/// the user is removed.
pub struct QuitProcessor;

impl Processor for QuitProcessor {
    fn name(&self) -> &'static str {
        "quit"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["QUIT"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let user = require_source(msg, "QUIT")?;
        let reason = msg.param(0).map(str::to_owned);

        let channels = ctx.state.channels_of(&user.nickname);
        if ctx.state.user(&user.nickname).is_some() {
            ctx.state.remove_user(&user.nickname)?;
        }

        ctx.emit(Event::Quit {
            user,
            reason,
            channels,
        });
        Ok(())
    }
}
