//! The client: one connection, its event queue, and everything hanging off
//! it.
//!
//! A [`Client`] is driven by [`Client::io_loop`] on a single task. All of
//! its behaviour, including the built-in protocol handling, is a set of
//! handlers on named events; embedders add their own with [`Client::on`].
//!
//! ```no_run
//! use slirc_client::{Client, ClientConfig, Event};
//!
//! # async fn run() -> slirc_client::error::Result<()> {
//! let mut client = Client::stateful(ClientConfig::new("irc.example.net", "ferris"));
//! client.on("001", |c: &mut Client, _: &Event| c.join("#rust", None));
//! client.on("PRIVMSG", |c: &mut Client, ev: &Event| {
//!     let Some(msg) = ev.message() else { return };
//!     if msg.params().first().map(String::as_str) == Some("!quit") {
//!         c.quit(Some("bye"));
//!     }
//! });
//! client.io_loop().await
//! # }
//! ```

mod commands;
mod handlers;
mod io;

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tokio::net::TcpStream;

use crate::casemap::CaseMapping;
use crate::config::ClientConfig;
use crate::event::{Dispatcher, Event, EventArg, EventName, EventQueue};
use crate::isupport::ServerSupport;
use crate::line::LineBuffer;
use crate::log::{LogLevel, Logger, TracingLogger};
use crate::mode::ModeFlag;
use crate::state::{Channel, Tracker, User};
use crate::timer::{TimerHost, TimerId, Timers};

/// Where a client is in its connection lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Never connected, or cleaned up before a reconnect.
    #[default]
    Disconnected,
    /// Opening the transport.
    Connecting,
    /// Transport up, PASS/NICK/USER queued, waiting for 001.
    Registering,
    /// The server welcomed us.
    Registered,
    /// The transport failed; waiting out the reconnect delay.
    Dead,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Registering => "registering",
            Self::Registered => "registered",
            Self::Dead => "dead",
        })
    }
}

/// An IRC client bound to one server.
pub struct Client {
    config: ClientConfig,
    state: ConnectionState,
    /// Our current nickname, tracked across NICK changes and collisions.
    nickname: String,
    socket: Option<TcpStream>,
    recvq: LineBuffer,
    sendq: VecDeque<String>,
    /// Encoded bytes of a line the socket only partly accepted.
    outbuf: BytesMut,
    dead_since: Option<Instant>,
    queue: EventQueue<Client>,
    timers: Timers<Client>,
    logger: Box<dyn Logger>,
    tracker: Option<Tracker>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("server", &self.config.server)
            .field("port", &self.config.port)
            .field("nickname", &self.nickname)
            .field("state", &self.state)
            .field("sendq", &self.sendq.len())
            .field("queue", &self.queue)
            .field("timers", &self.timers)
            .field("stateful", &self.tracker.is_some())
            .finish()
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.nickname, self.config.server, self.config.port)
    }
}

impl Dispatcher for Client {
    fn event_queue(&mut self) -> &mut EventQueue<Self> {
        &mut self.queue
    }
}

impl TimerHost for Client {
    fn timers(&mut self) -> &mut Timers<Self> {
        &mut self.timers
    }
}

impl Client {
    /// A client with the built-in protocol handlers only.
    pub fn new(config: ClientConfig) -> Self {
        let mut client = Self::bare(config);
        handlers::install_defaults(&mut client);
        client
    }

    /// A client that also tracks channels, users, and server capabilities.
    ///
    /// The tracking handlers are registered before any of yours, so by the
    /// time your `dead` handler runs the registries are already empty.
    pub fn stateful(config: ClientConfig) -> Self {
        let mut client = Self::new(config);
        client.tracker = Some(Tracker::new());
        handlers::install_tracking(&mut client);
        client
    }

    fn bare(config: ClientConfig) -> Self {
        Self {
            nickname: config.nickname.clone(),
            logger: Box::new(TracingLogger::new(config.server.clone())),
            config,
            state: ConnectionState::Disconnected,
            socket: None,
            recvq: LineBuffer::new(),
            sendq: VecDeque::new(),
            outbuf: BytesMut::new(),
            dead_since: None,
            queue: EventQueue::new(),
            timers: Timers::new(),
            tracker: None,
        }
    }

    /// Register `handler` for events named `name`.
    ///
    /// Protocol commands are named by their upper-cased verb (`PRIVMSG`),
    /// numerics by their three-digit code (`001`), mode changes by
    /// `mode_<flag>`.
    pub fn on<F>(&mut self, name: impl Into<EventName>, handler: F) -> &mut Self
    where
        F: FnMut(&mut Client, &Event) + Send + 'static,
    {
        self.queue.handle(name, handler);
        self
    }

    /// Post an event; it is handled on the next drain pass.
    pub fn post(&mut self, name: impl Into<EventName>, args: Vec<EventArg>) {
        self.queue.post(name, args);
    }

    /// Stop the client once the current drain pass finishes.
    pub fn exit(&mut self, from: impl Into<String>) {
        self.queue.post(EventName::EXIT, vec![EventArg::Text(from.into())]);
    }

    /// Run `callback` once, after `delay`.
    pub fn schedule_once<F>(&mut self, delay: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Client) + Send + 'static,
    {
        self.timers.schedule_once(delay, callback)
    }

    /// Run `callback` every `interval`.
    pub fn schedule_repeating<F>(&mut self, interval: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Client) + Send + 'static,
    {
        self.timers.schedule_repeating(interval, callback)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    /// Replace the logger. The default forwards to `tracing`.
    pub fn set_logger(&mut self, logger: impl Logger + 'static) {
        self.logger = Box::new(logger);
    }

    pub(crate) fn log(&self, level: LogLevel, message: &str) {
        self.logger.log(level, message);
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == ConnectionState::Dead
    }

    /// Whether the transport is up, registered or not.
    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
            && matches!(
                self.state,
                ConnectionState::Registering | ConnectionState::Registered
            )
    }

    /// Lines queued for sending, oldest first. Lines already handed to the
    /// socket are not included.
    pub fn pending_output(&self) -> impl Iterator<Item = &str> {
        self.sendq.iter().map(String::as_str)
    }

    /// The state tracker, for clients built with [`Client::stateful`].
    pub fn tracker(&self) -> Option<&Tracker> {
        self.tracker.as_ref()
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.tracker.as_ref()?.channel(name)
    }

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.tracker.as_ref()?.user(nick)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.tracker.iter().flat_map(Tracker::channels)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.tracker.iter().flat_map(Tracker::users)
    }

    /// `nick`'s status modes on `channel`.
    pub fn status(&self, nick: &str, channel: &str) -> Option<&BTreeSet<ModeFlag>> {
        self.tracker.as_ref()?.status(nick, channel)
    }

    pub fn support(&self) -> Option<&ServerSupport> {
        self.tracker.as_ref().map(Tracker::support)
    }

    /// The casemapping nicknames are compared with. RFC 1459 until a
    /// stateful client learns otherwise.
    pub fn casemapping(&self) -> CaseMapping {
        self.tracker
            .as_ref()
            .map_or_else(CaseMapping::default, Tracker::casemapping)
    }

    /// Whether `nick` is us.
    pub fn is_me(&self, nick: &str) -> bool {
        self.casemapping().equals(nick, &self.nickname)
    }
}
