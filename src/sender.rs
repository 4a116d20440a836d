//! Outbound pass-through to the transport.
//!
//! The engine never buffers or paces outbound lines. Whatever implements
//! [`RawSender`] receives each line (without CRLF) as soon as a processor,
//! listener or host asks for it to be sent.

use std::sync::Arc;

use crate::error::SendError;

/// Write side of the transport.
pub trait RawSender: Send + Sync {
    /// Hand one protocol line to the transport.
    fn send_raw(&self, line: String) -> Result<(), SendError>;
}

impl<T: RawSender + ?Sized> RawSender for Arc<T> {
    fn send_raw(&self, line: String) -> Result<(), SendError> {
        (**self).send_raw(line)
    }
}

impl RawSender for std::sync::mpsc::Sender<String> {
    fn send_raw(&self, line: String) -> Result<(), SendError> {
        self.send(line).map_err(|_| SendError::Closed)
    }
}

#[cfg(feature = "tokio")]
impl RawSender for tokio::sync::mpsc::UnboundedSender<String> {
    fn send_raw(&self, line: String) -> Result<(), SendError> {
        self.send(line).map_err(|_| SendError::Closed)
    }
}

#[cfg(feature = "tokio")]
impl RawSender for tokio::sync::mpsc::Sender<String> {
    /// Never waits for capacity; a full queue rejects the line.
    fn send_raw(&self, line: String) -> Result<(), SendError> {
        use tokio::sync::mpsc::error::TrySendError;

        self.try_send(line).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }
}

/// Discards everything. Useful for replaying transcripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSender;

impl RawSender for NullSender {
    fn send_raw(&self, _line: String) -> Result<(), SendError> {
        Ok(())
    }
}

/// Adapter turning a closure into a [`RawSender`]. See [`sender_fn`].
#[derive(Clone)]
pub struct FnSender<F>(F);

impl<F> RawSender for FnSender<F>
where
    F: Fn(String) + Send + Sync,
{
    fn send_raw(&self, line: String) -> Result<(), SendError> {
        (self.0)(line);
        Ok(())
    }
}

/// Wrap a closure as a sender.
///
/// ```
/// use slirc_engine::sender::{sender_fn, RawSender};
///
/// let sender = sender_fn(|line| println!(">> {line}"));
/// sender.send_raw("PONG :x".into()).unwrap();
/// ```
pub fn sender_fn<F>(f: F) -> FnSender<F>
where
    F: Fn(String) + Send + Sync,
{
    FnSender(f)
}
