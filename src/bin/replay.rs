//! slirc-replay - feed a recorded IRC transcript through the engine.
//!
//! Usage: `slirc-replay <transcript> [config.toml]`
//!
//! Every event is logged; outbound lines the engine would have sent are
//! logged instead of sent. Ends with a summary of the tracked state.

use std::io::{BufRead, BufReader};

use anyhow::Context as _;
use slirc_engine::sender::sender_fn;
use slirc_engine::{Engine, EngineConfig, Event, EventKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let transcript = args
        .next()
        .context("usage: slirc-replay <transcript> [config.toml]")?;

    let config = match args.next() {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => EngineConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_target(true)
        .init();

    let mut engine = Engine::new(config, sender_fn(|line| info!(%line, "=> outbound")))?;
    for kind in EventKind::ALL {
        engine.dispatcher().register_fn(kind, |event, _ctx| {
            match event {
                Event::Error(err) => warn!(
                    kind = err.kind.as_str(),
                    severity = ?err.severity,
                    line = err.raw_line.as_deref(),
                    "{}",
                    err.message
                ),
                other => info!(event = ?other, "event"),
            }
            Ok(())
        });
    }

    let file = std::fs::File::open(&transcript).with_context(|| format!("opening {transcript}"))?;
    let mut lines = 0usize;
    let mut failed = 0usize;
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("reading {transcript}"))?;
        lines += 1;
        if engine.handle_line(&line).is_err() {
            failed += 1;
        }
    }

    let collected = engine.collect_empty_channels();
    let state = engine.state();
    if let Err(e) = state.check_invariants() {
        error!(error = %e, "state is inconsistent after replay");
    }
    info!(
        lines,
        failed,
        users = state.user_count(),
        channels = state.channel_count(),
        collected = collected.len(),
        local = state.local_nick(),
        network = state.network(),
        "replay finished"
    );
    Ok(())
}
