//! # slirc-engine
//!
//! IRC client protocol engine. Feed it raw lines from a connection; it
//! decodes them, routes each message to its processors, keeps a live model
//! of users and channels, and notifies listeners through typed events.
//!
//! ```
//! use slirc_engine::{Engine, EngineConfig, Event, EventKind};
//! use slirc_engine::sender::NullSender;
//!
//! let mut engine = Engine::new(EngineConfig::default(), NullSender).unwrap();
//! engine.dispatcher().register_fn(EventKind::Invite, |event, _ctx| {
//!     if let Event::Invite { inviter, channel } = event {
//!         println!("{} invited us to {}", inviter.nickname, channel);
//!     }
//!     Ok(())
//! });
//! engine.handle_line(":alice!a@example.org INVITE me #rust\r\n").unwrap();
//! ```
//!
//! Processing is sequential: a line is decoded, processed and dispatched
//! completely before the next one is looked at. Listener failures never
//! reach the caller; they come back as [`Event::Error`].

pub mod config;
pub mod dispatch;
#[cfg(feature = "tokio")]
pub mod driver;
pub mod engine;
pub mod error;
pub mod event;
pub mod processors;
pub mod sender;
pub mod state;
pub mod telemetry;

pub use config::{ConfigError, EngineConfig};
pub use dispatch::{Dispatcher, Listener, ListenerContext, RegistrationHandle, Scope};
#[cfg(feature = "tokio")]
pub use driver::drive;
pub use engine::Engine;
pub use error::{ErrorInfo, ErrorKind, Severity};
pub use event::{Event, EventKind};
pub use sender::RawSender;
pub use state::StateModel;

pub use slirc_wire as wire;
