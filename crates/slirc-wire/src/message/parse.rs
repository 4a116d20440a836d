//! Line decoding.
//!
//! The head of the line (tags, prefix, command) is parsed with nom; the
//! parameter list is split by hand since its only rule is the trailing `:`.

use std::str::FromStr;

use nom::{
    bytes::complete::{take_till, take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use crate::error::DecodeError;

use super::tags::unescape_tag_value;
use super::types::{RawMessage, Tag};

/// Parse IRCv3 message tags (the part after `@` and before the first space).
fn parse_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

/// Parse the message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the optional tags and prefix, skipping the spaces after each.
fn parse_head(input: &str) -> IResult<&str, (Option<&str>, Option<&str>)> {
    let (input, tags) = opt(parse_tags)(input)?;
    let (input, _) = space0(input)?;
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;
    Ok((input, (tags, prefix)))
}

/// Take the command token: everything up to the first space.
fn parse_command_token(input: &str) -> IResult<&str, &str> {
    take_till(|c| c == ' ')(input)
}

/// A command is `1*letter` or `3digit`.
fn is_valid_command(cmd: &str) -> bool {
    let is_all_letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let is_three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());
    is_all_letters || is_three_digits
}

/// Split the parameter section that follows the command.
///
/// Middle parameters are separated by runs of spaces. The first token
/// starting with `:` and everything after it, spaces included, form the
/// trailing parameter.
fn parse_params(input: &str) -> SmallVec<[&str; 15]> {
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = input;

    while rest.starts_with(' ') {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// Parse a raw tags string (without the leading `@`) into tags.
fn parse_tags_string(tags_str: &str) -> Vec<Tag> {
    tags_str
        .split(';')
        .filter(|s| !s.is_empty())
        .map(|tag| {
            let mut iter = tag.splitn(2, '=');
            let key = iter.next().unwrap_or("");
            let value = iter.next().map(unescape_tag_value);
            Tag(key.to_owned(), value)
        })
        .collect()
}

/// Decode one protocol line into a [`RawMessage`].
///
/// Trailing CR/LF terminators are removed first. A leading `@tags` section
/// and a leading `:prefix` are both optional. Numeric commands keep their
/// three digit string form.
///
/// # Errors
///
/// [`DecodeError::Empty`] for a blank line, [`DecodeError::MissingCommand`]
/// when only tags or a prefix are present, and
/// [`DecodeError::InvalidCommand`] for a malformed command token.
///
/// # Example
///
/// ```
/// use slirc_wire::decode;
///
/// let msg = decode("PING :irc.example.net").unwrap();
/// assert!(msg.prefix.is_none());
/// assert_eq!(msg.command, "PING");
/// assert_eq!(msg.params, ["irc.example.net"]);
/// ```
pub fn decode(line: &str) -> Result<RawMessage, DecodeError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let (rest, (tags, prefix)) = parse_head(line).map_err(|_| DecodeError::MissingCommand)?;
    let (rest, command) =
        parse_command_token(rest).map_err(|_| DecodeError::MissingCommand)?;

    if command.is_empty() {
        return Err(DecodeError::MissingCommand);
    }
    if !is_valid_command(command) {
        return Err(DecodeError::InvalidCommand {
            command: command.to_owned(),
            position: line.len() - rest.len() - command.len(),
        });
    }

    Ok(RawMessage {
        tags: tags.map(parse_tags_string).unwrap_or_default(),
        prefix: prefix.map(str::to_owned),
        command: command.to_owned(),
        params: parse_params(rest).into_iter().map(str::to_owned).collect(),
    })
}

impl FromStr for RawMessage {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<RawMessage, Self::Err> {
        decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_line() {
        let msg = decode(":nick!user@host COMMAND p1 p2 :trailing text\r\n").unwrap();
        assert_eq!(msg.prefix.as_deref(), Some("nick!user@host"));
        assert_eq!(msg.command, "COMMAND");
        assert_eq!(msg.params, ["p1", "p2", "trailing text"]);
    }

    #[test]
    fn test_decode_without_prefix() {
        let msg = decode("PING irc.example.net").unwrap();
        assert!(msg.prefix.is_none());
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, ["irc.example.net"]);
    }

    #[test]
    fn test_trailing_is_verbatim() {
        let msg = decode("PRIVMSG #c :  spaced :colons: here  ").unwrap();
        assert_eq!(msg.params, ["#c", "  spaced :colons: here  "]);
    }

    #[test]
    fn test_empty_trailing() {
        let msg = decode(":srv TOPIC #c :").unwrap();
        assert_eq!(msg.params, ["#c", ""]);
    }

    #[test]
    fn test_collapses_space_runs() {
        let msg = decode("MODE  #c   +o    nick").unwrap();
        assert_eq!(msg.params, ["#c", "+o", "nick"]);
    }

    #[test]
    fn test_no_param_limit() {
        let line = format!("CMD {}", (0..20).map(|i| i.to_string()).collect::<Vec<_>>().join(" "));
        assert_eq!(decode(&line).unwrap().params.len(), 20);
    }

    #[test]
    fn test_numeric_kept_as_string() {
        let msg = decode(":server 005 me CASEMAPPING=ascii :are supported").unwrap();
        assert_eq!(msg.command, "005");
        assert_eq!(msg.numeric(), Some(5));
    }

    #[test]
    fn test_tags_are_parsed() {
        let msg = decode("@time=2023-01-01T00:00:00Z;key=a\\sb;flag :n!u@h PRIVMSG #c :hi").unwrap();
        assert_eq!(msg.tag("time"), Some("2023-01-01T00:00:00Z"));
        assert_eq!(msg.tag("key"), Some("a b"));
        assert_eq!(msg.tag("flag"), Some(""));
        assert_eq!(msg.prefix.as_deref(), Some("n!u@h"));
    }

    #[test]
    fn test_empty_and_blank_lines() {
        assert_eq!(decode(""), Err(DecodeError::Empty));
        assert_eq!(decode("\r\n"), Err(DecodeError::Empty));
        assert_eq!(decode("   "), Err(DecodeError::Empty));
    }

    #[test]
    fn test_missing_command() {
        assert_eq!(decode(":prefix.only"), Err(DecodeError::MissingCommand));
        assert_eq!(decode(":prefix "), Err(DecodeError::MissingCommand));
    }

    #[test]
    fn test_invalid_command() {
        assert_eq!(
            decode(":srv PR1V x"),
            Err(DecodeError::InvalidCommand {
                command: "PR1V".to_string(),
                position: 5,
            })
        );
        assert!(matches!(decode("12 foo"), Err(DecodeError::InvalidCommand { .. })));
    }

    #[test]
    fn test_from_str() {
        let msg: RawMessage = "JOIN #rust".parse().unwrap();
        assert_eq!(msg, RawMessage::new("JOIN", ["#rust"]));
    }
}
