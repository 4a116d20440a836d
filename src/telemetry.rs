//! Tracing helpers for line processing.

use slirc_wire::RawMessage;

/// Extract msgid from message tags if present.
pub fn extract_msgid(msg: &RawMessage) -> Option<&str> {
    msg.tag("msgid")
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{debug_span, Span};

    /// Span around the handling of one inbound line.
    pub fn line(command: &str, source: Option<&str>, msgid: Option<&str>) -> Span {
        debug_span!("irc.line", command = %command, source = source, msgid = msgid)
    }

    /// Span for a line that failed to decode.
    pub fn undecodable(len: usize) -> Span {
        debug_span!("irc.line", command = "?", len = len)
    }
}
