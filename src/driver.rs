//! Single-consumer line driver.
//!
//! A transport that reads on its own task hands complete lines over an
//! `mpsc` channel; [`drive`] feeds them to the engine in order, one at a
//! time, so processing stays sequential.

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::Engine;

/// Feed lines from `lines` to `engine` until the channel closes.
///
/// Returns the number of lines received. Undecodable lines count too; they
/// are reported through the engine's error events.
pub async fn drive(engine: &mut Engine, mut lines: mpsc::Receiver<String>) -> usize {
    let mut handled = 0;
    while let Some(line) = lines.recv().await {
        if let Err(err) = engine.handle_line(&line) {
            debug!(error = %err, "line skipped");
        }
        handled += 1;
    }
    debug!(handled, "line source closed");
    handled
}
