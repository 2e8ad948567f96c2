//! Parsed protocol lines.
//!
//! A [`Message`] is built once from a raw line and never changes afterwards;
//! the event queue hands it to handlers behind an `Arc`.
//!
//! ```
//! use slirc_client::Message;
//!
//! let msg: Message = ":nick!user@host PRIVMSG #rust :hello world".parse().unwrap();
//! assert_eq!(msg.command(), "PRIVMSG");
//! assert_eq!(msg.origin_nick(), Some("nick"));
//! assert_eq!(msg.target(), Some("#rust"));
//! assert_eq!(msg.params(), ["hello", "world"]);
//! ```

mod nom_parser;
mod origin;

use std::str::FromStr;

use crate::ctcp::{self, CTCP_DELIM};
use crate::error::MessageParseError;
use crate::response::Response;

use self::nom_parser::RawLine;
pub use self::origin::Nickmask;

/// Channel prefixes used by [`Message::to_channel`].
const DEFAULT_CHANNEL_PREFIXES: &[char] = &['#', '&', '!'];

/// One parsed protocol line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    raw: String,
    origin: Option<String>,
    mask: Option<Nickmask>,
    command: String,
    target: Option<String>,
    params: Vec<String>,
    ctcp: Option<String>,
}

impl Message {
    /// Parse a single line. A trailing `\r\n` or `\n` is ignored.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let parts = RawLine::parse(line).map_err(|position| MessageParseError::InvalidLine {
            line: line.to_owned(),
            position,
        })?;

        // Free-form text with no explicit target *is* the target.
        let (target, remainder) = match (parts.target, parts.remainder) {
            (None, Some(text)) => (Some(text), None),
            other => other,
        };

        let mut params: Vec<String> = remainder
            .map(|text| text.split_ascii_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();
        let ctcp = take_ctcp_verb(&mut params);

        Ok(Self {
            raw: line.to_owned(),
            origin: parts.origin.map(str::to_owned),
            mask: parts.origin.and_then(Nickmask::parse),
            command: parts.command.to_ascii_uppercase(),
            target: target.map(str::to_owned),
            params,
            ctcp,
        })
    }

    /// The line as received, without its terminator.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The origin as sent, without the leading `:`.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// The origin split into nick, user and host, if it was a nickmask.
    pub fn nickmask(&self) -> Option<&Nickmask> {
        self.mask.as_ref()
    }

    pub fn origin_nick(&self) -> Option<&str> {
        self.mask.as_ref().map(|m| m.nick.as_str())
    }

    pub fn origin_user(&self) -> Option<&str> {
        self.mask.as_ref().map(|m| m.user.as_str())
    }

    pub fn origin_host(&self) -> Option<&str> {
        self.mask.as_ref().map(|m| m.host.as_str())
    }

    /// The upper-cased command, or the three-digit numeric.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The numeric reply this message carries, if it is a known one.
    pub fn response(&self) -> Option<Response> {
        self.command.parse().ok()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Space-tokenized trailing parameters. For CTCP messages this is the
    /// payload with the verb and delimiters removed.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The lower-cased CTCP verb, if this message carried one.
    pub fn ctcp(&self) -> Option<&str> {
        self.ctcp.as_deref()
    }

    pub fn is_ctcp(&self) -> bool {
        self.ctcp.is_some()
    }

    pub fn is_action(&self) -> bool {
        self.ctcp.as_deref() == Some(ctcp::ACTION)
    }

    pub fn is_dcc(&self) -> bool {
        self.ctcp.as_deref() == Some(ctcp::DCC)
    }

    /// Whether the target looks like a channel name.
    pub fn to_channel(&self) -> bool {
        self.target
            .as_deref()
            .is_some_and(|t| t.starts_with(DEFAULT_CHANNEL_PREFIXES))
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}

/// Unwrap a CTCP payload in place and return its verb.
fn take_ctcp_verb(params: &mut Vec<String>) -> Option<String> {
    if !params.first()?.starts_with(CTCP_DELIM) {
        return None;
    }

    if let Some(last) = params.last_mut() {
        if last.ends_with(CTCP_DELIM) {
            last.pop();
        }
    }

    let verb = params.remove(0);
    let verb = verb[CTCP_DELIM.len_utf8()..].to_lowercase();
    (!verb.is_empty()).then_some(verb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privmsg_with_params() {
        let msg = Message::parse(":nick!user@host PRIVMSG #channel :Hello, world!\r\n").unwrap();
        assert_eq!(msg.raw(), ":nick!user@host PRIVMSG #channel :Hello, world!");
        assert_eq!(msg.origin(), Some("nick!user@host"));
        assert_eq!(msg.origin_user(), Some("user"));
        assert_eq!(msg.origin_host(), Some("host"));
        assert_eq!(msg.target(), Some("#channel"));
        assert_eq!(msg.params(), ["Hello,", "world!"]);
        assert!(msg.to_channel());
        assert!(!msg.is_ctcp());
    }

    #[test]
    fn test_free_form_becomes_target() {
        let msg = Message::parse(":nick!user@host JOIN #foo").unwrap();
        assert_eq!(msg.target(), Some("#foo"));
        assert!(msg.params().is_empty());

        let msg = Message::parse("PING :irc.example.com").unwrap();
        assert_eq!(msg.command(), "PING");
        assert_eq!(msg.target(), Some("irc.example.com"));
        assert!(msg.params().is_empty());

        let msg = Message::parse(":old!u@h NICK :new").unwrap();
        assert_eq!(msg.target(), Some("new"));
    }

    #[test]
    fn test_server_origin_has_no_mask() {
        let msg = Message::parse(":irc.example.com 001 bot :Welcome to IRC").unwrap();
        assert_eq!(msg.origin(), Some("irc.example.com"));
        assert_eq!(msg.origin_nick(), None);
        assert_eq!(msg.command(), "001");
        assert_eq!(msg.response(), Some(Response::RPL_WELCOME));
        assert_eq!(msg.params(), ["Welcome", "to", "IRC"]);
    }

    #[test]
    fn test_command_is_upper_cased() {
        let msg = Message::parse(":n!u@h privmsg #c :x").unwrap();
        assert_eq!(msg.command(), "PRIVMSG");
    }

    #[test]
    fn test_names_reply_keeps_inner_colon() {
        let msg = Message::parse(":srv 353 me = #chan :@alice +bob carol").unwrap();
        assert_eq!(msg.target(), Some("me"));
        assert_eq!(msg.params(), ["=", "#chan", ":@alice", "+bob", "carol"]);
    }

    #[test]
    fn test_ctcp_ping() {
        let msg = Message::parse(":a!b@c PRIVMSG me :\x01PING 123\x01").unwrap();
        assert_eq!(msg.ctcp(), Some("ping"));
        assert_eq!(msg.params(), ["123"]);
    }

    #[test]
    fn test_ctcp_without_payload() {
        let msg = Message::parse(":a!b@c PRIVMSG me :\x01VERSION\x01").unwrap();
        assert_eq!(msg.ctcp(), Some("version"));
        assert!(msg.params().is_empty());
    }

    #[test]
    fn test_ctcp_action() {
        let msg = Message::parse(":a!b@c PRIVMSG #chan :\x01ACTION waves at you\x01").unwrap();
        assert!(msg.is_action());
        assert_eq!(msg.params(), ["waves", "at", "you"]);
    }

    #[test]
    fn test_empty_and_invalid() {
        assert_eq!(Message::parse("\r\n"), Err(MessageParseError::EmptyMessage));
        assert!(matches!(
            Message::parse(":lonely"),
            Err(MessageParseError::InvalidLine { .. })
        ));
    }
}
