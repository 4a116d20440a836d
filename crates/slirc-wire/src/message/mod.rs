//! Raw IRC message types, decoding and encoding.

mod parse;
mod serialize;
/// IRCv3 tag escaping utilities.
pub mod tags;
mod types;

pub use self::parse::decode;
pub use self::types::{RawMessage, Tag};
