//! MODE processing.
//!
//! Channel mode strings are split into [`ModeChange`]s using the server's
//! `PREFIX` and `CHANMODES` tokens to decide which letters take a parameter.

use slirc_wire::{ChanModes, ModeClass, PrefixSpec, RawMessage};
use tracing::debug;

use super::core::{has_params, Context, Processor};
use crate::error::{ProcessResult, StateError};
use crate::event::{Event, ModeChange};
use crate::state::ListEntry;

/// Split a mode string and its arguments into individual changes.
///
/// ```
/// use slirc_engine::processors::mode::parse_mode_changes;
/// use slirc_wire::{ChanModes, PrefixSpec};
///
/// let args = ["alice".to_string(), "*!*@spam".to_string()];
/// let changes = parse_mode_changes("+ob-n", &args, &PrefixSpec::default(), &ChanModes::default());
/// assert_eq!(changes.len(), 3);
/// assert_eq!(changes[0].param.as_deref(), Some("alice"));
/// assert!(!changes[2].adding);
/// ```
pub fn parse_mode_changes(
    modes: &str,
    args: &[String],
    prefix: &PrefixSpec,
    chanmodes: &ChanModes,
) -> Vec<ModeChange> {
    let mut args = args.iter();
    let mut adding = true;
    let mut changes = Vec::new();

    for c in modes.chars() {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            mode => {
                let takes_param = prefix.is_prefix_mode(mode)
                    || match chanmodes.class_of(mode) {
                        ModeClass::List | ModeClass::Always => true,
                        ModeClass::OnSet => adding,
                        ModeClass::Flag => false,
                    };
                let param = if takes_param { args.next().cloned() } else { None };
                changes.push(ModeChange {
                    adding,
                    mode,
                    param,
                });
            }
        }
    }
    changes
}

/// Apply channel mode changes to state. Changes naming unknown members are
/// skipped.
fn apply_channel_changes(
    ctx: &mut Context<'_>,
    channel: &str,
    changes: &[ModeChange],
    setter: Option<&str>,
) -> ProcessResult {
    if ctx.state.channel(channel).is_none() {
        debug!(channel = %channel, "mode change for untracked channel");
        return Ok(());
    }

    for change in changes {
        let is_prefix = ctx.state.prefix().is_prefix_mode(change.mode);
        let class = ctx.state.chanmodes().class_of(change.mode);

        if is_prefix {
            let Some(nick) = change.param.as_deref() else {
                continue;
            };
            match ctx.state.set_member_mode(channel, nick, change.mode, change.adding) {
                Ok(_) => {}
                Err(StateError::UnknownUser(_)) => {
                    debug!(channel = %channel, nick = %nick, "mode for non-member ignored");
                }
                Err(e) => return Err(e.into()),
            }
        } else if class == ModeClass::List {
            // A bare list letter is a list query, not a change.
            let Some(mask) = change.param.clone() else {
                continue;
            };
            let entry = ListEntry {
                mask,
                set_by: setter.map(str::to_owned),
                set_at: None,
            };
            ctx.state.update_list(channel, change.mode, change.adding, entry)?;
        } else {
            ctx.state
                .set_channel_mode(channel, change.mode, change.adding, change.param.clone())?;
        }
    }
    Ok(())
}

/// Apply a user mode string to a flag set like `iw`.
fn merge_user_modes(current: &str, changes: &str) -> String {
    let mut flags: Vec<char> = current.chars().collect();
    let mut adding = true;
    for c in changes.chars() {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            c if adding => {
                if !flags.contains(&c) {
                    flags.push(c);
                }
            }
            c => flags.retain(|f| *f != c),
        }
    }
    flags.sort_unstable();
    flags.into_iter().collect()
}

/// Processor for `MODE` and `RPL_CHANNELMODEIS` (324).
///
/// `:setter MODE <channel> <modes> [args...]`
/// `:setter MODE <nick> <modes>`
/// `:server 324 <nick> <channel> <modes> [args...]`
pub struct ModeProcessor;

impl Processor for ModeProcessor {
    fn name(&self) -> &'static str {
        "mode"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["MODE", "324"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        if msg.command == "324" {
            return channel_mode_is(ctx, msg);
        }
        if !has_params(msg, 2) {
            return Ok(());
        }

        let target = msg.params[0].clone();
        let setter = msg.source();

        if ctx.state.is_channel_name(&target) {
            let changes = parse_mode_changes(
                &msg.params[1],
                &msg.params[2..],
                ctx.state.prefix(),
                ctx.state.chanmodes(),
            );
            let setter_nick = setter.as_ref().map(|s| s.nickname.as_str());
            apply_channel_changes(ctx, &target, &changes, setter_nick)?;
            ctx.emit(Event::ChannelModeChanged {
                channel: target,
                setter,
                changes,
            });
        } else {
            let modes = msg.params[1..].join(" ");
            let current = ctx
                .state
                .user(&target)
                .map(|u| u.attribute("modes").unwrap_or_default().to_owned());
            if let Some(current) = current {
                let merged = merge_user_modes(&current, &msg.params[1]);
                ctx.state.set_user_attribute(&target, "modes", Some(merged))?;
            }
            ctx.emit(Event::UserModeChanged {
                nickname: target,
                setter,
                modes,
            });
        }
        Ok(())
    }
}

fn channel_mode_is(ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
    if !has_params(msg, 3) {
        return Ok(());
    }
    let channel = msg.params[1].clone();
    let changes = parse_mode_changes(
        &msg.params[2],
        &msg.params[3..],
        ctx.state.prefix(),
        ctx.state.chanmodes(),
    );
    apply_channel_changes(ctx, &channel, &changes, None)?;
    ctx.emit(Event::ChannelModeChanged {
        channel,
        setter: None,
        changes,
    });
    Ok(())
}
