use std::fmt::{self, Display, Formatter};

use super::tags::escape_tag_value;
use super::types::RawMessage;

impl RawMessage {
    /// Encode to wire form without a line terminator.
    ///
    /// The transport appends its own line ending. Decoding the result yields
    /// an equal message as long as no middle parameter is empty, contains a
    /// space, or starts with `:`.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

fn needs_colon(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

impl Display for RawMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.tags.is_empty() {
            write!(f, "@")?;

            for (i, tag) in self.tags.iter().enumerate() {
                if i > 0 {
                    write!(f, ";")?;
                }

                write!(f, "{}", tag.0)?;

                if let Some(ref value) = tag.1 {
                    write!(f, "=")?;
                    escape_tag_value(f, value)?;
                }
            }

            write!(f, " ")?;
        }

        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        write!(f, "{}", self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {}", param)?;
            }
            if needs_colon(last) {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::message::{decode, RawMessage};

    #[test]
    fn test_encode_plain() {
        let msg = RawMessage::new("JOIN", ["#rust"]);
        assert_eq!(msg.encode(), "JOIN #rust");
    }

    #[test]
    fn test_encode_trailing_with_space() {
        let msg = RawMessage::new("PRIVMSG", ["#rust", "hello world"]).with_prefix("n!u@h");
        assert_eq!(msg.encode(), ":n!u@h PRIVMSG #rust :hello world");
    }

    #[test]
    fn test_encode_empty_and_colon_trailing() {
        assert_eq!(RawMessage::new("TOPIC", ["#c", ""]).encode(), "TOPIC #c :");
        assert_eq!(RawMessage::new("PRIVMSG", ["#c", ":)"]).encode(), "PRIVMSG #c ::)");
    }

    #[test]
    fn test_encode_tags() {
        let msg = RawMessage::new("PING", ["x"])
            .with_tag("key", Some("a b;c"))
            .with_tag("flag", None);
        assert_eq!(msg.encode(), "@key=a\\sb\\:c;flag PING x");
        assert_eq!(decode(&msg.encode()).unwrap(), msg);
    }
}
