//! Listener trait and the context handed to each invocation.

use crate::error::SendError;
use crate::event::Event;
use crate::sender::RawSender;
use crate::state::StateModel;

use super::{Dispatcher, RegistrationHandle};

/// Result of one listener invocation. Errors are reported, never propagated.
pub type ListenerResult = anyhow::Result<()>;

/// An event subscriber.
///
/// Listeners run synchronously on the processing path. Long-running work
/// belongs on the host's own executor.
pub trait Listener: Send + Sync {
    fn on_event(&self, event: &Event, ctx: &ListenerContext<'_>) -> ListenerResult;
}

pub(super) struct FnListener<F>(pub(super) F);

impl<F> Listener for FnListener<F>
where
    F: Fn(&Event, &ListenerContext<'_>) -> ListenerResult + Send + Sync,
{
    fn on_event(&self, event: &Event, ctx: &ListenerContext<'_>) -> ListenerResult {
        (self.0)(event, ctx)
    }
}

/// What a listener can see and do while it runs.
pub struct ListenerContext<'a> {
    pub(super) state: &'a StateModel,
    pub(super) sender: &'a dyn RawSender,
    pub(super) dispatcher: &'a Dispatcher,
    pub(super) handle: RegistrationHandle,
}

impl<'a> ListenerContext<'a> {
    /// Read-only view of the State Model as of the current line.
    pub fn state(&self) -> &'a StateModel {
        self.state
    }

    /// Handle of the registration being invoked.
    pub fn handle(&self) -> RegistrationHandle {
        self.handle
    }

    /// The dispatcher delivering this event, for registering more listeners.
    pub fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }

    /// Remove this listener. Takes effect immediately, including for the
    /// rest of the current dispatch.
    pub fn unregister_self(&self) -> bool {
        self.dispatcher.unregister(self.handle)
    }

    /// Write a line straight to the transport.
    pub fn send_raw(&self, line: impl Into<String>) -> Result<(), SendError> {
        self.sender.send_raw(line.into())
    }
}
