//! IRC numeric reply codes as listed in RFC 1459.
//!
//! The client only wires default handlers to a handful of these, but the
//! whole table is available so embedders can register handlers by name
//! (`client.on(Response::RPL_ENDOFMOTD, ...)`) instead of by bare digits.

#![allow(non_camel_case_types)]

use std::str::FromStr;
use thiserror::Error;

macro_rules! responses {
    ($( $(#[$doc:meta])* $name:ident = $code:literal, )*) => {
        /// IRC server numeric reply.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        #[non_exhaustive]
        pub enum Response {
            $( $(#[$doc])* $name = $code, )*
        }

        impl Response {
            /// Creates a Response from a numeric code
            pub fn from_code(code: u16) -> Option<Response> {
                match code {
                    $( $code => Some(Response::$name), )*
                    _ => None,
                }
            }

            /// The canonical constant name, e.g. `"RPL_WELCOME"`.
            pub fn name(&self) -> &'static str {
                match self {
                    $( Response::$name => stringify!($name), )*
                }
            }
        }
    };
}

responses! {
    // === Connection Registration ===
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 002 - Your host is running version
    RPL_YOURHOST = 2,
    /// 003 - Server creation date
    RPL_CREATED = 3,
    /// 004 - Server info
    RPL_MYINFO = 4,
    /// 005 - Server supported features (ISUPPORT)
    RPL_ISUPPORT = 5,

    // === Command Responses ===
    RPL_TRACELINK = 200,
    RPL_TRACECONNECTING = 201,
    RPL_TRACEHANDSHAKE = 202,
    RPL_TRACEUNKNOWN = 203,
    RPL_TRACEOPERATOR = 204,
    RPL_TRACEUSER = 205,
    RPL_TRACESERVER = 206,
    RPL_TRACENEWTYPE = 208,
    RPL_TRACECLASS = 209,
    RPL_STATSLINKINFO = 211,
    RPL_STATSCOMMANDS = 212,
    RPL_STATSCLINE = 213,
    RPL_STATSNLINE = 214,
    RPL_STATSILINE = 215,
    RPL_STATSKLINE = 216,
    RPL_STATSQLINE = 217,
    RPL_STATSYLINE = 218,
    RPL_ENDOFSTATS = 219,
    /// 221 - User mode string
    RPL_UMODEIS = 221,
    RPL_SERVICEINFO = 231,
    RPL_ENDOFSERVICES = 232,
    RPL_SERVICE = 233,
    RPL_SERVLIST = 234,
    RPL_SERVLISTEND = 235,
    RPL_STATSLLINE = 241,
    RPL_STATSUPTIME = 242,
    RPL_STATSOLINE = 243,
    RPL_STATSHLINE = 244,
    RPL_LUSERCLIENT = 251,
    RPL_LUSEROP = 252,
    RPL_LUSERUNKNOWN = 253,
    RPL_LUSERCHANNELS = 254,
    RPL_LUSERME = 255,
    RPL_ADMINME = 256,
    RPL_ADMINLOC1 = 257,
    RPL_ADMINLOC2 = 258,
    RPL_ADMINEMAIL = 259,
    RPL_TRACELOG = 261,
    RPL_NONE = 300,
    /// 301 - User is away
    RPL_AWAY = 301,
    RPL_USERHOST = 302,
    RPL_ISON = 303,
    RPL_UNAWAY = 305,
    RPL_NOWAWAY = 306,
    RPL_WHOISUSER = 311,
    RPL_WHOISSERVER = 312,
    RPL_WHOISOPERATOR = 313,
    RPL_WHOWASUSER = 314,
    RPL_ENDOFWHO = 315,
    RPL_WHOISCHANOP = 316,
    RPL_WHOISIDLE = 317,
    RPL_ENDOFWHOIS = 318,
    RPL_WHOISCHANNELS = 319,
    RPL_LISTSTART = 321,
    RPL_LIST = 322,
    RPL_LISTEND = 323,
    /// 324 - Channel mode string and its arguments
    RPL_CHANNELMODEIS = 324,
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    RPL_INVITING = 341,
    RPL_SUMMONING = 342,
    RPL_VERSION = 351,
    RPL_WHOREPLY = 352,
    /// 353 - Names list for a channel
    RPL_NAMREPLY = 353,
    RPL_KILLDONE = 361,
    RPL_CLOSING = 362,
    RPL_CLOSEEND = 363,
    RPL_LINKS = 364,
    RPL_ENDOFLINKS = 365,
    /// 366 - End of names list
    RPL_ENDOFNAMES = 366,
    RPL_BANLIST = 367,
    RPL_ENDOFBANLIST = 368,
    RPL_ENDOFWHOWAS = 369,
    RPL_INFO = 371,
    RPL_MOTD = 372,
    RPL_INFOSTART = 373,
    RPL_ENDOFINFO = 374,
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,
    RPL_YOUREOPER = 381,
    RPL_REHASHING = 382,
    RPL_MYPORTIS = 384,
    RPL_TIME = 391,
    RPL_USERSSTART = 392,
    RPL_USERS = 393,
    RPL_ENDOFUSERS = 394,
    RPL_NOUSERS = 395,

    // === Error Replies ===
    ERR_NOSUCHNICK = 401,
    ERR_NOSUCHSERVER = 402,
    ERR_NOSUCHCHANNEL = 403,
    ERR_CANNOTSENDTOCHAN = 404,
    ERR_TOOMANYCHANNELS = 405,
    ERR_WASNOSUCHNICK = 406,
    ERR_TOOMANYTARGETS = 407,
    ERR_NOORIGIN = 409,
    ERR_NORECIPIENT = 411,
    ERR_NOTEXTTOSEND = 412,
    ERR_NOTOPLEVEL = 413,
    ERR_WILDTOPLEVEL = 414,
    ERR_UNKNOWNCOMMAND = 421,
    ERR_NOMOTD = 422,
    ERR_NOADMININFO = 423,
    ERR_FILEERROR = 424,
    ERR_NONICKNAMEGIVEN = 431,
    ERR_ERRONEOUSNICKNAME = 432,
    /// 433 - Nickname is already in use
    ERR_NICKNAMEINUSE = 433,
    ERR_NICKCOLLISION = 436,
    ERR_USERNOTINCHANNEL = 441,
    ERR_NOTONCHANNEL = 442,
    ERR_USERONCHANNEL = 443,
    ERR_NOLOGIN = 444,
    ERR_SUMMONDISABLED = 445,
    ERR_USERSDISABLED = 446,
    ERR_NOTREGISTERED = 451,
    ERR_NEEDMOREPARAMS = 461,
    ERR_ALREADYREGISTERED = 462,
    ERR_NOPERMFORHOST = 463,
    ERR_PASSWDMISMATCH = 464,
    ERR_YOUREBANNEDCREEP = 465,
    ERR_YOUWILLBEBANNED = 466,
    ERR_KEYSET = 467,
    ERR_CHANNELISFULL = 471,
    ERR_UNKNOWNMODE = 472,
    ERR_INVITEONLYCHAN = 473,
    ERR_BANNEDFROMCHAN = 474,
    ERR_BADCHANNELKEY = 475,
    ERR_BADCHANMASK = 476,
    ERR_NOPRIVILEGES = 481,
    ERR_CHANOPRIVSNEEDED = 482,
    ERR_CANTKILLSERVER = 483,
    ERR_NOOPERHOST = 491,
    ERR_NOSERVICEHOST = 492,
    ERR_UMODEUNKNOWNFLAG = 501,
    ERR_USERSDONTMATCH = 502,
}

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is an error reply (4xx or 5xx)
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 {
            return Err(ParseResponseError::InvalidFormat);
        }
        let code: u16 = s.parse().map_err(|_| ParseResponseError::InvalidFormat)?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownCode(code))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Error when parsing a response code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseResponseError {
    /// The string was not a three-digit number
    #[error("invalid response code format")]
    InvalidFormat,
    /// The numeric code is not a known response
    #[error("unknown response code: {0}")]
    UnknownCode(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_code() {
        assert_eq!(Response::RPL_WELCOME.code(), 1);
        assert_eq!(Response::ERR_NICKNAMEINUSE.code(), 433);
        assert_eq!(Response::RPL_ENDOFMOTD.code(), 376);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Response::from_code(1), Some(Response::RPL_WELCOME));
        assert_eq!(Response::from_code(353), Some(Response::RPL_NAMREPLY));
        assert_eq!(Response::from_code(999), None);
    }

    #[test]
    fn test_name() {
        assert_eq!(Response::RPL_ISUPPORT.name(), "RPL_ISUPPORT");
        assert_eq!(Response::RPL_CHANNELMODEIS.name(), "RPL_CHANNELMODEIS");
        assert_eq!(Response::ERR_NICKNAMEINUSE.name(), "ERR_NICKNAMEINUSE");
    }

    #[test]
    fn test_parse() {
        assert_eq!("001".parse::<Response>().unwrap(), Response::RPL_WELCOME);
        assert_eq!(
            "433".parse::<Response>().unwrap(),
            Response::ERR_NICKNAMEINUSE
        );
        assert_eq!("1".parse::<Response>(), Err(ParseResponseError::InvalidFormat));
        assert_eq!(
            "998".parse::<Response>(),
            Err(ParseResponseError::UnknownCode(998))
        );
        assert!("abc".parse::<Response>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Response::RPL_WELCOME), "001");
        assert_eq!(format!("{}", Response::RPL_ISUPPORT), "005");
        assert_eq!(format!("{}", Response::ERR_NICKNAMEINUSE), "433");
    }

    #[test]
    fn test_is_error() {
        assert!(!Response::RPL_WELCOME.is_error());
        assert!(Response::ERR_NICKNAMEINUSE.is_error());
        assert!(Response::ERR_USERSDONTMATCH.is_error());
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(
            ParseResponseError::InvalidFormat.to_string(),
            "invalid response code format"
        );
        assert_eq!(
            ParseResponseError::UnknownCode(998).to_string(),
            "unknown response code: 998"
        );
    }
}
