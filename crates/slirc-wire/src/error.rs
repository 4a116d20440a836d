//! Error types for the wire layer.

use thiserror::Error;

/// Errors encountered when decoding a raw protocol line.
///
/// Decode failures are never fatal to a session: the engine drops the line
/// and optionally surfaces the error as a low-severity event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The line was empty once line terminators were removed.
    #[error("empty line")]
    Empty,

    /// The line carried tags and/or a prefix but no command token.
    #[error("missing command")]
    MissingCommand,

    /// The command token was neither letters nor a three digit numeric.
    #[error("invalid command {command:?} at position {position}")]
    InvalidCommand {
        /// The offending token.
        command: String,
        /// Byte offset of the token within the line.
        position: usize,
    },
}
