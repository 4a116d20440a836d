//! Error taxonomy for the engine.
//!
//! Nothing in here ever stops line processing. Decode failures, processor
//! failures, listener failures and rejected state mutations are all turned
//! into an [`ErrorInfo`] and delivered through the event dispatcher as
//! [`Event::Error`](crate::event::Event::Error).

use slirc_wire::{CaseMapping, DecodeError};
use thiserror::Error;

use crate::event::Event;

// ============================================================================
// State errors (invariant violations)
// ============================================================================

/// A state mutation that would break a model invariant.
///
/// The mutation is rejected and the previous consistent state is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("nickname {nick} collides with existing user {existing}")]
    NickCollision { nick: String, existing: String },

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("casemapping {mapping} would merge distinct names into {key}")]
    CaseMappingCollision { key: String, mapping: CaseMapping },

    #[error("inconsistent state: {0}")]
    Inconsistent(String),
}

// ============================================================================
// Processor errors
// ============================================================================

/// Errors raised by a processor while handling a well-formed line.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("{command} requires a user prefix")]
    MissingSource { command: &'static str },

    #[error("invalid {what}: {value}")]
    InvalidParam { what: &'static str, value: String },

    #[error(transparent)]
    Invariant(#[from] StateError),

    #[error("processor panicked: {0}")]
    Panicked(String),
}

/// Result type for processors.
pub type ProcessResult = Result<(), ProcessorError>;

/// Outbound line could not be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("transport closed")]
    Closed,

    #[error("transport queue full")]
    Full,
}

// ============================================================================
// Error events
// ============================================================================

/// How loudly an error should be surfaced by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Warning,
    Error,
    Fatal,
}

/// Where an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Reported by the server itself (`ERROR`).
    Generic,
    /// A line could not be decoded.
    Decode,
    /// A processor failed on a decoded line.
    Processor,
    /// A listener failed while receiving an event.
    Listener,
    /// A state mutation was rejected.
    Invariant,
}

impl ErrorKind {
    /// Static label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Decode => "decode",
            Self::Processor => "processor",
            Self::Listener => "listener",
            Self::Invariant => "invariant",
        }
    }
}

/// Payload of [`Event::Error`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    /// The protocol line being handled, when there was one.
    pub raw_line: Option<String>,
    /// The event whose delivery failed, for listener errors.
    pub trigger: Option<Box<Event>>,
}

impl ErrorInfo {
    /// An error reported by the server.
    pub fn generic(message: impl Into<String>, raw_line: Option<String>) -> Self {
        Self {
            kind: ErrorKind::Generic,
            severity: Severity::Warning,
            message: message.into(),
            raw_line,
            trigger: None,
        }
    }

    /// A line that failed to decode.
    pub fn decode(err: &DecodeError, line: &str) -> Self {
        Self {
            kind: ErrorKind::Decode,
            severity: Severity::Low,
            message: err.to_string(),
            raw_line: Some(line.to_owned()),
            trigger: None,
        }
    }

    /// A processor failure. Invariant violations are reported at
    /// [`Severity::Fatal`] under their own kind.
    pub fn processor(processor: &str, err: &ProcessorError, raw_line: String) -> Self {
        let (kind, severity) = match err {
            ProcessorError::Invariant(_) => (ErrorKind::Invariant, Severity::Fatal),
            _ => (ErrorKind::Processor, Severity::Error),
        };
        Self {
            kind,
            severity,
            message: format!("{processor}: {err}"),
            raw_line: Some(raw_line),
            trigger: None,
        }
    }

    /// A listener failure while delivering `trigger`.
    pub fn listener(message: impl Into<String>, trigger: &Event) -> Self {
        Self {
            kind: ErrorKind::Listener,
            severity: Severity::Error,
            message: message.into(),
            raw_line: None,
            trigger: Some(Box::new(trigger.clone())),
        }
    }
}

/// Render a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
