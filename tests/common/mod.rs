//! Integration test common infrastructure.
//!
//! Provides an engine harness that records outbound lines and every
//! dispatched event, so tests can feed protocol lines and assert on both.

pub mod harness;
pub mod recorder;

#[allow(unused_imports)]
pub use harness::TestEngine;
#[allow(unused_imports)]
pub use recorder::{EventLog, RecordingSender};
