//! Typed, fault-isolated event fan-out.
//!
//! Listeners register per [`EventKind`], optionally behind a [`Scope`], and
//! are invoked in registration order. The registry may be changed from
//! inside a listener: dispatch works on a snapshot of the matching entries
//! and checks each entry's `active` flag right before invoking it, so a
//! listener removed mid-dispatch is not called again.
//!
//! A listener that returns an error or panics does not stop delivery to the
//! others. Its failure becomes an [`Event::Error`] that is dispatched to the
//! error listeners, skipping the one that failed. If an error listener fails
//! during that secondary dispatch the failure is only logged.

mod listener;
mod scope;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, trace, warn};

use crate::error::{panic_message, ErrorInfo};
use crate::event::{Event, EventKind};
use crate::sender::RawSender;
use crate::state::StateModel;

pub use listener::{Listener, ListenerContext, ListenerResult};
pub use scope::Scope;

/// Identifies one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationHandle(u64);

impl RegistrationHandle {
    /// Numeric id, unique per dispatcher.
    pub fn id(self) -> u64 {
        self.0
    }
}

struct Entry {
    handle: RegistrationHandle,
    kind: EventKind,
    scope: Scope,
    listener: Box<dyn Listener>,
    active: AtomicBool,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Arc<Entry>>,
}

/// The Callback/Event Dispatcher.
#[derive(Default)]
pub struct Dispatcher {
    registry: Mutex<Registry>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.registry.lock().entries.len())
            .finish()
    }
}

impl Dispatcher {
    /// An empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event of `kind`.
    pub fn register<L>(&self, kind: EventKind, listener: L) -> RegistrationHandle
    where
        L: Listener + 'static,
    {
        self.register_scoped(kind, Scope::Any, listener)
    }

    /// Register a closure listener.
    ///
    /// ```
    /// use slirc_engine::dispatch::Dispatcher;
    /// use slirc_engine::event::EventKind;
    ///
    /// let dispatcher = Dispatcher::new();
    /// let handle = dispatcher.register_fn(EventKind::Invite, |event, _ctx| {
    ///     println!("{event:?}");
    ///     Ok(())
    /// });
    /// assert_eq!(dispatcher.listener_count(EventKind::Invite), 1);
    /// assert!(dispatcher.unregister(handle));
    /// ```
    pub fn register_fn<F>(&self, kind: EventKind, f: F) -> RegistrationHandle
    where
        F: Fn(&Event, &ListenerContext<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        self.register_scoped(kind, Scope::Any, listener::FnListener(f))
    }

    /// Closure listener behind a [`Scope`].
    pub fn register_scoped_fn<F>(&self, kind: EventKind, scope: Scope, f: F) -> RegistrationHandle
    where
        F: Fn(&Event, &ListenerContext<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        self.register_scoped(kind, scope, listener::FnListener(f))
    }

    /// Register a listener that only sees events admitted by `scope`.
    pub fn register_scoped<L>(&self, kind: EventKind, scope: Scope, listener: L) -> RegistrationHandle
    where
        L: Listener + 'static,
    {
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let handle = RegistrationHandle(registry.next_id);
        registry.entries.push(Arc::new(Entry {
            handle,
            kind,
            scope,
            listener: Box::new(listener),
            active: AtomicBool::new(true),
        }));
        trace!(?kind, handle = handle.0, "listener registered");
        handle
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub fn unregister(&self, handle: RegistrationHandle) -> bool {
        let mut registry = self.registry.lock();
        match registry.entries.iter().position(|e| e.handle == handle) {
            Some(pos) => {
                let entry = registry.entries.remove(pos);
                entry.active.store(false, Ordering::Release);
                trace!(handle = handle.0, "listener unregistered");
                true
            }
            None => false,
        }
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registry
            .lock()
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    /// Deliver `event` to its listeners.
    ///
    /// Returns whether at least one listener was invoked.
    pub fn dispatch(&self, event: &Event, state: &StateModel, sender: &dyn RawSender) -> bool {
        self.dispatch_at(event, state, sender, None, 0)
    }

    fn snapshot(&self, kind: EventKind) -> Vec<Arc<Entry>> {
        self.registry
            .lock()
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    fn dispatch_at(
        &self,
        event: &Event,
        state: &StateModel,
        sender: &dyn RawSender,
        skip: Option<RegistrationHandle>,
        depth: u8,
    ) -> bool {
        let mut invoked = false;

        for entry in self.snapshot(event.kind()) {
            if Some(entry.handle) == skip || !entry.active.load(Ordering::Acquire) {
                continue;
            }
            if !entry.scope.admits(event, state.casemap()) {
                continue;
            }
            invoked = true;

            let ctx = ListenerContext {
                state,
                sender,
                dispatcher: self,
                handle: entry.handle,
            };
            let failure = match catch_unwind(AssertUnwindSafe(|| entry.listener.on_event(event, &ctx))) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{err:#}"),
                Err(payload) => format!("listener panicked: {}", panic_message(&*payload)),
            };

            if depth == 0 {
                warn!(handle = entry.handle.0, kind = ?event.kind(), error = %failure, "listener failed");
                let report = Event::Error(ErrorInfo::listener(failure, event));
                self.dispatch_at(&report, state, sender, Some(entry.handle), depth + 1);
            } else {
                error!(
                    handle = entry.handle.0,
                    error = %failure,
                    "error listener failed while handling a listener failure"
                );
            }
        }

        invoked
    }
}
