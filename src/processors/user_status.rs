//! Away tracking: `AWAY` (away-notify), `RPL_UNAWAY` (305), `RPL_NOWAWAY` (306).

use slirc_wire::RawMessage;
use tracing::debug;

use super::core::{has_params, require_source, Context, Processor};
use crate::error::ProcessResult;
use crate::event::Event;

pub struct AwayProcessor;

impl Processor for AwayProcessor {
    fn name(&self) -> &'static str {
        "away"
    }

    fn commands(&self) -> &'static [&'static str] {
        &["AWAY", "305", "306"]
    }

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult {
        let (nickname, away) = match msg.command.as_str() {
            "305" | "306" => {
                if !has_params(msg, 1) {
                    return Ok(());
                }
                // 306 text is server boilerplate; keep any message we already know
                let away = (msg.command == "306").then(|| {
                    ctx.state
                        .user(&msg.params[0])
                        .and_then(|u| u.away())
                        .unwrap_or_default()
                        .to_owned()
                });
                (msg.params[0].clone(), away)
            }
            _ => {
                let user = require_source(msg, "AWAY")?;
                let away = msg.param(0).filter(|m| !m.is_empty()).map(str::to_owned);
                (user.nickname, away)
            }
        };

        if ctx.state.user(&nickname).is_some() {
            ctx.state.set_away(&nickname, away.clone())?;
        } else {
            debug!(nick = %nickname, "away status for untracked user");
        }

        ctx.emit(Event::AwayChanged { nickname, away });
        Ok(())
    }
}
