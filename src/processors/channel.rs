//! Channel membership processors: JOIN, PART, KICK, INVITE and NAMES.

use slirc_wire::{Hostmask, RawMessage};
use tracing::debug;

use super::core::{has_params, require_source, Context, Processor};
use crate::error::ProcessResult;
use crate::event::Event;

/// Processor for `JOIN`.
///
/// `:nick!ident@host JOIN <channel> [<account> :<realname>]`
///
/// The bracketed parameters are sent by servers with `extended-join`.
/// Joins to channels we are not in are reported but not tracked.
pub struct JoinProcessor;

impl Processor for JoinProcessor {
    fn name(&self) -> &'static str {
        "join"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["JOIN"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let user = require_source(msg, "JOIN")?;
        if !has_params(msg, 1) {
            return Ok(());
        }
        let channel = msg.params[0].clone();

        let ours = ctx.state.is_local(&user.nickname);
        if ours {
            ctx.state.add_channel(&channel);
        }
        if ours || ctx.state.is_local_member(&channel) {
            ctx.state.add_membership(&channel, &user, &[])?;

            if let (Some(account), Some(realname)) = (msg.param(1), msg.param(2)) {
                let account = (account != "*").then(|| account.to_owned());
                ctx.state.set_user_attribute(&user.nickname, "account", account)?;
                ctx.state
                    .set_user_attribute(&user.nickname, "realname", Some(realname.to_owned()))?;
            }
        } else {
            debug!(channel = %channel, nick = %user.nickname, "join to a channel we are not in");
        }

        ctx.emit(Event::Join { channel, user });
        Ok(())
    }
}

/// Processor for `PART`.
///
/// `:nick!ident@host PART <channel> [:<reason>]`
pub struct PartProcessor;

impl Processor for PartProcessor {
    fn name(&self) -> &'static str {
        "part"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["PART"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let user = require_source(msg, "PART")?;
        if !has_params(msg, 1) {
            return Ok(());
        }
        let channel = msg.params[0].clone();
        let reason = msg.param(1).map(str::to_owned);

        leave(ctx, &channel, &user.nickname)?;

        ctx.emit(Event::Part {
            channel,
            user,
            reason,
        });
        Ok(())
    }
}

/// Processor for `KICK`.
///
/// `:kicker!ident@host KICK <channel> <nick> [:<reason>]`
pub struct KickProcessor;

impl Processor for KickProcessor {
    fn name(&self) -> &'static str {
        "kick"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["KICK"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let kicker = require_source(msg, "KICK")?;
        if !has_params(msg, 2) {
            return Ok(());
        }
        let channel = msg.params[0].clone();
        let kicked = msg.params[1].clone();
        let reason = msg.param(2).map(str::to_owned);

        leave(ctx, &channel, &kicked)?;

        ctx.emit(Event::Kick {
            channel,
            kicker,
            kicked,
            reason,
        });
        Ok(())
    }
}

/// Drop `nick` from `channel`; if it is us, drop the whole channel.
fn leave(ctx: &mut Context<'_>, channel: &str, nick: &str) -> ProcessResult {
    if ctx.state.channel(channel).is_none() {
        debug!(channel = %channel, "leave from untracked channel");
        return Ok(());
    }
    if ctx.state.is_local(nick) {
        ctx.state.remove_channel(channel)?;
    } else {
        ctx.state.remove_membership(channel, nick)?;
    }
    Ok(())
}

/// Processor for `INVITE`.
///
/// `:inviter!ident@host INVITE <target> <channel>`
///
/// Lines with fewer than two parameters are ignored. Invites carry no
/// state, so a repeated line yields a repeated event and nothing else.
pub struct InviteProcessor;

impl Processor for InviteProcessor {
    fn name(&self) -> &'static str {
        "invite"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["INVITE"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        if !has_params(msg, 2) {
            return Ok(());
        }
        let inviter = require_source(msg, "INVITE")?;
        ctx.emit(Event::Invite {
            inviter,
            channel: msg.params[1].clone(),
        });
        Ok(())
    }
}

/// Processor for `RPL_NAMREPLY` (353) and `RPL_ENDOFNAMES` (366).
///
/// `:server 353 <nick> <symbol> <channel> :[prefix]<nick>[!ident@host] ...`
///
/// Some servers omit the symbol. With `userhost-in-names` each entry is a
/// full hostmask. Members are only tracked for channels we are in.
pub struct NamesProcessor;

impl Processor for NamesProcessor {
    fn name(&self) -> &'static str {
        "names"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["353", "366"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        if msg.command == "366" {
            if !has_params(msg, 2) {
                return Ok(());
            }
            ctx.emit(Event::NamesComplete {
                channel: msg.params[1].clone(),
            });
            return Ok(());
        }

        if !has_params(msg, 3) {
            return Ok(());
        }
        let (channel, names) = if msg.params.len() == 3 {
            (&msg.params[1], &msg.params[2])
        } else {
            (&msg.params[2], &msg.params[3])
        };

        let entries: Vec<(Vec<char>, Hostmask)> = {
            let prefix = ctx.state.prefix();
            names
                .split_whitespace()
                .map(|entry| {
                    let (modes, rest) = prefix.strip_symbols(entry);
                    (modes, Hostmask::parse(rest))
                })
                .filter(|(_, mask)| !mask.nickname.is_empty())
                .collect()
        };

        ctx.state.add_channel(channel);
        let ours = ctx.state.is_local_member(channel)
            || entries.iter().any(|(_, mask)| ctx.state.is_local(&mask.nickname));
        if !ours {
            debug!(channel = %channel, "names for a channel we are not in");
            return Ok(());
        }
        for (modes, mask) in &entries {
            ctx.state.add_membership(channel, mask, modes)?;
        }
        Ok(())
    }
}
