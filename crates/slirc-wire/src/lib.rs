//! # slirc-wire
//!
//! The wire layer of the slirc client engine: everything needed to turn one
//! line of IRC text into a structured [`RawMessage`] and back, plus the small
//! identity helpers that processors need later on.
//!
//! ## Features
//!
//! - Line decoding into prefix, command and ordered parameters
//! - IRCv3 message tags (parsed, unescaped and re-escaped on encode)
//! - [`Hostmask`] parsing for `nick!ident@host` sources
//! - Server-declared [`CaseMapping`] for nickname and channel comparison
//! - ISUPPORT (`005`) token parsing
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_wire::{decode, Hostmask};
//!
//! let msg = decode(":nick!user@host PRIVMSG #rust :hello there\r\n").unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.params, ["#rust", "hello there"]);
//!
//! let source = Hostmask::parse(msg.prefix.as_deref().unwrap());
//! assert_eq!(source.nickname, "nick");
//! ```
//!
//! Hostmasks are deliberately not decoded by [`decode`]: not every command
//! carries a user prefix, so the processor that needs one parses it.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod error;
pub mod hostmask;
pub mod isupport;
pub mod message;
pub mod util;

pub use self::casemap::CaseMapping;
pub use self::error::DecodeError;
pub use self::hostmask::Hostmask;
pub use self::isupport::{ChanModes, Isupport, IsupportEntry, ModeClass, PrefixSpec};
pub use self::message::{decode, RawMessage, Tag};
pub use self::util::wildcard_match;
