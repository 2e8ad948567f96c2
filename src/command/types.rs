//! IRC command types.
//!
//! Only the commands a client sends are modelled; anything else goes out
//! through [`Command::Raw`].

/// IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    // === Connection Registration ===
    /// `PASS password`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `USER username mode * :realname`
    USER(String, String, String),
    /// `QUIT [:message]`
    QUIT(Option<String>),
    /// `PONG token`
    PONG(String),

    // === Channel Operations ===
    /// `JOIN channel [key]`
    JOIN(String, Option<String>),
    /// `PART channel [:message]`
    PART(String, Option<String>),
    /// `MODE target [modes and arguments]`
    ///
    /// The second field is written verbatim, so `"+o nick"` stays two words.
    MODE(String, Option<String>),
    /// `TOPIC channel [:topic]`
    ///
    /// `None` queries the topic. An empty string clears it.
    TOPIC(String, Option<String>),
    /// `INVITE nickname channel`
    INVITE(String, String),
    /// `KICK channel user [:comment]`
    KICK(String, String, Option<String>),

    // === Messaging ===
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `NOTICE target :text`
    NOTICE(String, String),

    /// A line sent exactly as given.
    Raw(String),
}

impl Command {
    /// The verb this command is sent with. `Raw` reports its first word.
    pub fn verb(&self) -> &str {
        match self {
            Command::PASS(..) => "PASS",
            Command::NICK(..) => "NICK",
            Command::USER(..) => "USER",
            Command::QUIT(..) => "QUIT",
            Command::PONG(..) => "PONG",
            Command::JOIN(..) => "JOIN",
            Command::PART(..) => "PART",
            Command::MODE(..) => "MODE",
            Command::TOPIC(..) => "TOPIC",
            Command::INVITE(..) => "INVITE",
            Command::KICK(..) => "KICK",
            Command::PRIVMSG(..) => "PRIVMSG",
            Command::NOTICE(..) => "NOTICE",
            Command::Raw(line) => line.split(' ').next().unwrap_or_default(),
        }
    }
}
