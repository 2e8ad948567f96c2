//! # slirc-client
//!
//! A small, event-driven IRC client engine.
//!
//! ## Features
//!
//! - Cooperative event queue with named handlers and deferred `exit`
//! - Async connection loop with newline framing, timers, and a fixed
//!   reconnect backoff
//! - Line parser with CTCP unwrapping
//! - Optional channel/user tracking with RFC 1459 case folding
//! - Mode parsing driven by the server's ISUPPORT tables

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ```no_run
//! use slirc_client::{Client, ClientConfig, Event};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), slirc_client::ConfigError> {
//!     let config = ClientConfig::new("irc.libera.chat", "slirc-bot");
//!     let mut client = Client::stateful(config);
//!
//!     client.on("001", |c: &mut Client, _: &Event| c.join("#slirc", None));
//!     client.on("mode_oper", |_: &mut Client, ev: &Event| {
//!         if let Some(change) = ev.mode() {
//!             println!("{change}");
//!         }
//!     });
//!
//!     client.io_loop().await
//! }
//! ```
//!
//! ### Parsing lines
//!
//! ```rust
//! use slirc_client::Message;
//!
//! let msg: Message = ":nick!user@host PRIVMSG #rust :\x01PING 123\x01".parse().unwrap();
//! assert_eq!(msg.origin_nick(), Some("nick"));
//! assert_eq!(msg.ctcp(), Some("ping"));
//! assert_eq!(msg.params(), ["123"]);
//! ```

pub mod casemap;
pub mod client;
pub mod command;
pub mod config;
pub mod ctcp;
pub mod error;
pub mod event;
pub mod isupport;
pub mod line;
pub mod log;
pub mod message;
pub mod mode;
pub mod response;
pub mod state;
pub mod timer;

pub use self::casemap::{irc_eq, irc_to_lower, CaseMapping, IrcMap};
pub use self::client::{Client, ConnectionState};
pub use self::command::Command;
pub use self::config::ClientConfig;
pub use self::ctcp::Ctcp;
pub use self::error::{ConfigError, MessageParseError};
pub use self::event::{Event, EventArg, EventName};
pub use self::isupport::{Isupport, ServerSupport};
pub use self::log::{LogLevel, Logger, NullLogger, TracingLogger};
pub use self::message::Message;
pub use self::mode::{ModeChange, ModeFlag, Sign};
pub use self::response::Response;
pub use self::timer::TimerId;
