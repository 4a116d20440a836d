//! Processor plumbing: the trait, the per-line context, and the registry.

mod registry;

use slirc_wire::{Hostmask, RawMessage};
use tracing::{debug, warn};

use crate::config::EngineSettings;
use crate::dispatch::Dispatcher;
use crate::error::{ProcessResult, ProcessorError, SendError};
use crate::event::Event;
use crate::sender::RawSender;
use crate::state::StateModel;

pub use registry::ProcessorRegistry;

/// A handler bound to one or more command tokens.
///
/// Processors are stateless; everything they touch comes in through the
/// [`Context`].
pub trait Processor: Send + Sync {
    /// Short name used in error reports.
    fn name(&self) -> &'static str;

    /// Command tokens this processor handles, upper case.
    fn commands(&self) -> &'static [&'static str];

    fn process(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> ProcessResult;
}

/// Everything a processor may use while handling one line.
pub struct Context<'a> {
    pub state: &'a mut StateModel,
    pub dispatcher: &'a Dispatcher,
    pub sender: &'a dyn RawSender,
    pub settings: &'a EngineSettings,
    /// The line as received, for error reports.
    pub line: &'a str,
}

impl Context<'_> {
    /// Dispatch an event against the current state.
    pub fn emit(&self, event: Event) -> bool {
        self.dispatcher.dispatch(&event, &*self.state, self.sender)
    }

    /// Send a line to the transport, announcing it as `RawLineOut` when
    /// raw-line events are enabled.
    pub fn send_raw(&self, line: String) -> Result<(), SendError> {
        if self.settings.emit_raw_lines {
            self.emit(Event::RawLineOut { line: line.clone() });
        }
        self.sender.send_raw(line).inspect_err(|e| {
            warn!(error = %e, "outbound line dropped");
        })
    }
}

/// The message source as a hostmask, or `MissingSource`.
pub(crate) fn require_source(msg: &RawMessage, command: &'static str) -> Result<Hostmask, ProcessorError> {
    msg.source().ok_or(ProcessorError::MissingSource { command })
}

/// Whether `msg` has at least `n` parameters. Short lines are logged and
/// otherwise ignored.
pub(crate) fn has_params(msg: &RawMessage, n: usize) -> bool {
    if msg.params.len() < n {
        debug!(
            command = %msg.command,
            got = msg.params.len(),
            want = n,
            "malformed line ignored"
        );
        return false;
    }
    true
}
