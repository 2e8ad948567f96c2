use std::fmt;

/// The `nick!user@host` form of a message origin.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Nickmask {
    pub nick: String,
    pub user: String,
    pub host: String,
}

impl Nickmask {
    /// Split an origin into its three parts.
    ///
    /// Returns `None` for server names and any origin where one of the
    /// parts would be empty.
    pub fn parse(origin: &str) -> Option<Self> {
        let (rest, host) = origin.rsplit_once('@')?;
        let (nick, user) = rest.rsplit_once('!')?;

        if nick.is_empty() || user.is_empty() || host.is_empty() {
            return None;
        }

        Some(Self {
            nick: nick.to_owned(),
            user: user.to_owned(),
            host: host.to_owned(),
        })
    }
}

impl fmt::Display for Nickmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nick, self.user, self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nickmask() {
        let mask = Nickmask::parse("nick!~user@host.example.com").unwrap();
        assert_eq!(mask.nick, "nick");
        assert_eq!(mask.user, "~user");
        assert_eq!(mask.host, "host.example.com");
        assert_eq!(mask.to_string(), "nick!~user@host.example.com");
    }

    #[test]
    fn test_server_origin_is_not_a_mask() {
        assert_eq!(Nickmask::parse("irc.example.com"), None);
        assert_eq!(Nickmask::parse("nick@host"), None);
        assert_eq!(Nickmask::parse("!user@host"), None);
    }

    #[test]
    fn test_host_keeps_bang() {
        let mask = Nickmask::parse("a!b@c!d").unwrap();
        assert_eq!(mask.nick, "a");
        assert_eq!(mask.user, "b");
        assert_eq!(mask.host, "c!d");
    }
}
