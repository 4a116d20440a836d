//! Recording sender and event log.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use slirc_engine::error::SendError;
use slirc_engine::{Dispatcher, ErrorInfo, Event, EventKind, RawSender, RegistrationHandle};

/// Sender that keeps every outbound line.
#[derive(Clone, Default)]
pub struct RecordingSender {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingSender {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl RawSender for RecordingSender {
    fn send_raw(&self, line: String) -> Result<(), SendError> {
        self.lines.lock().push(line);
        Ok(())
    }
}

/// Collects events delivered to listeners it registers.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    /// Record every event of `kinds`.
    pub fn attach(&self, dispatcher: &Dispatcher, kinds: &[EventKind]) -> Vec<RegistrationHandle> {
        kinds
            .iter()
            .map(|&kind| {
                let events = self.events.clone();
                dispatcher.register_fn(kind, move |event, _| {
                    events.lock().push(event.clone());
                    Ok(())
                })
            })
            .collect()
    }

    /// Record every event of every kind.
    pub fn attach_all(&self, dispatcher: &Dispatcher) -> Vec<RegistrationHandle> {
        self.attach(dispatcher, &EventKind::ALL)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn errors(&self) -> Vec<ErrorInfo> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Error(info) => Some(info.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}
