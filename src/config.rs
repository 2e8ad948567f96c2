//! Connection parameters.

use std::net::IpAddr;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 6667;

/// How long a dead client waits before reconnecting.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Everything a [`Client`](crate::Client) needs to reach a server and
/// register.
///
/// ```
/// use slirc_client::ClientConfig;
///
/// let config = ClientConfig::new("irc.example.net", "ferris")
///     .port(6697)
///     .realname("Ferris the Crab");
/// assert_eq!(config.username, "ferris");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Server hostname or address.
    pub server: String,
    pub port: u16,
    /// Sent as `PASS` before registering, if set.
    pub password: Option<String>,
    /// Nickname to register with.
    pub nickname: String,
    /// Username (ident).
    pub username: String,
    /// Real name / GECOS.
    pub realname: String,
    /// Local address to bind the outgoing socket to.
    pub bind_to: Option<IpAddr>,
    pub reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: DEFAULT_PORT,
            password: None,
            nickname: String::new(),
            username: String::new(),
            realname: String::new(),
            bind_to: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

impl ClientConfig {
    /// A config for `server` with `nickname` also used as username and
    /// real name.
    pub fn new(server: impl Into<String>, nickname: impl Into<String>) -> Self {
        let nickname = nickname.into();
        Self {
            server: server.into(),
            username: nickname.clone(),
            realname: nickname.clone(),
            nickname,
            ..Self::default()
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = nickname.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn realname(mut self, realname: impl Into<String>) -> Self {
        self.realname = realname.into();
        self
    }

    pub fn bind_to(mut self, addr: IpAddr) -> Self {
        self.bind_to = Some(addr);
        self
    }

    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Check that every field needed to connect is present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("server", &self.server),
            ("nickname", &self.nickname),
            ("username", &self.username),
            ("realname", &self.realname),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::MissingField(*field));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        Ok(())
    }
}
