//! CTCP (Client-to-Client Protocol) framing.
//!
//! CTCP requests ride inside PRIVMSG and NOTICE bodies, wrapped in `\x01`.
//! Incoming requests are unwrapped by the parser (see [`Message::ctcp`]);
//! this module holds the verb names the client knows and builds outgoing
//! payloads.
//!
//! [`Message::ctcp`]: crate::Message::ctcp

use std::fmt;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

// Verbs as they appear in `Message::ctcp()`, already lower-cased.
pub const ACTION: &str = "action";
pub const CLIENTINFO: &str = "clientinfo";
pub const DCC: &str = "dcc";
pub const PING: &str = "ping";
pub const TIME: &str = "time";
pub const VERSION: &str = "version";

/// Verbs answered by the default handlers, as advertised in CLIENTINFO.
pub const ANSWERED: &[&str] = &[ACTION, CLIENTINFO, PING, TIME, VERSION];

/// An outgoing CTCP payload. Its `Display` output is the delimited body.
///
/// ```
/// use slirc_client::ctcp::Ctcp;
///
/// assert_eq!(Ctcp::new("action", "waves").to_string(), "\x01ACTION waves\x01");
/// assert_eq!(Ctcp::new("version", "").to_string(), "\x01VERSION\x01");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    pub verb: &'a str,
    pub payload: &'a str,
}

impl<'a> Ctcp<'a> {
    pub fn new(verb: &'a str, payload: &'a str) -> Self {
        Self { verb, payload }
    }
}

impl fmt::Display for Ctcp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CTCP_DELIM}{}", self.verb.to_ascii_uppercase())?;
        if !self.payload.is_empty() {
            write!(f, " {}", self.payload)?;
        }
        write!(f, "{CTCP_DELIM}")
    }
}

/// Check if a message body carries a CTCP request.
#[inline]
pub fn is_ctcp(text: &str) -> bool {
    text.starts_with(CTCP_DELIM)
}
