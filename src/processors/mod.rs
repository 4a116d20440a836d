//! Command processors.
//!
//! Each processor handles one or more command tokens: it updates the
//! [`StateModel`](crate::state::StateModel) and emits the matching
//! [`Event`](crate::event::Event). Hosts can add their own through
//! [`ProcessorRegistry::register`].

pub mod channel;
pub mod connection;
pub mod core;
pub mod messaging;
pub mod mode;
pub mod topic;
pub mod user_status;

pub use self::core::{Context, Processor, ProcessorRegistry};
