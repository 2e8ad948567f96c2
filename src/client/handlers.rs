//! Built-in handlers every client starts with, plus the ones that wire a
//! [`Tracker`] into a stateful client.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;

use super::{Client, ConnectionState};
use crate::command::Command;
use crate::ctcp::{self, Ctcp};
use crate::event::{Event, EventArg, EventName};
use crate::log::LogLevel;
use crate::message::Message;
use crate::response::Response;
use crate::state::StateAction;

const VERSION_REPLY: &str = concat!("slirc-client-", env!("CARGO_PKG_VERSION"));

/// Events the tracker needs to see.
const TRACKED: &[&str] = &["JOIN", "PART", "KICK", "NICK", "QUIT", "MODE", "005", "324", "353"];

pub(super) fn install_defaults(client: &mut Client) {
    client
        .on(EventName::READ_READY, |c: &mut Client, _: &Event| c.read())
        .on(EventName::WRITE_READY, |c: &mut Client, _: &Event| c.write())
        .on(EventName::RECVQ_READY, |c: &mut Client, _: &Event| c.parse())
        .on(EventName::DEAD, |c: &mut Client, _: &Event| c.mark_dead())
        .on(EventName::EXIT, |c: &mut Client, ev: &Event| {
            let from = ev.text().unwrap_or("exit");
            c.log(LogLevel::Fatal, &format!("exiting via {from}..."));
        })
        .on("PING", |c: &mut Client, ev: &Event| {
            if let Some(token) = ev.message().and_then(Message::target) {
                c.send(Command::PONG(token.to_owned()));
            }
        })
        .on(Response::RPL_WELCOME, |c: &mut Client, _: &Event| {
            c.state = ConnectionState::Registered;
            let (server, port) = (&c.config.server, c.config.port);
            c.log(LogLevel::Info, &format!("connected to {server}:{port}"));
        })
        .on(Response::ERR_NICKNAMEINUSE, |c: &mut Client, ev: &Event| {
            let taken = ev
                .message()
                .and_then(|m| m.param(0))
                .unwrap_or(c.nickname.as_str())
                .to_owned();
            c.nickname = format!("{taken}{}", rand::thread_rng().gen_range(0..100));
            let nick = c.nickname.clone();
            c.nick(&nick);
        })
        .on("NICK", |c: &mut Client, ev: &Event| {
            let Some(msg) = ev.message() else { return };
            if let (Some(old), Some(new)) = (msg.origin_nick(), msg.target()) {
                if c.is_me(old) {
                    c.nickname = new.to_owned();
                }
            }
        })
        .on("PRIVMSG", |c: &mut Client, ev: &Event| {
            if let Some(msg) = ev.message() {
                c.reply_ctcp(msg);
            }
        });
}

pub(super) fn install_tracking(client: &mut Client) {
    client.on(EventName::DEAD, |c: &mut Client, _: &Event| {
        if let Some(tracker) = c.tracker.as_mut() {
            tracker.reset();
        }
    });
    for name in TRACKED {
        client.on(*name, |c: &mut Client, ev: &Event| c.track(ev));
    }
}

impl Client {
    /// Turn every complete buffered line into an event.
    fn parse(&mut self) {
        while let Some(line) = self.recvq.next_line() {
            if line.is_empty() {
                continue;
            }
            self.log(LogLevel::Debug, &format!("-> {line}"));

            match Message::parse(&line) {
                Ok(msg) => {
                    let name = msg.command().to_owned();
                    self.queue.post(name, vec![EventArg::Message(Arc::new(msg))]);
                }
                Err(e) => self.log(LogLevel::Debug, &format!("dropping line: {e}")),
            }
        }
    }

    fn mark_dead(&mut self) {
        if self.state == ConnectionState::Dead {
            return;
        }
        let (server, port) = (&self.config.server, self.config.port);
        self.log(LogLevel::Info, &format!("lost connection to {server}:{port}"));
        self.state = ConnectionState::Dead;
        self.dead_since = Some(Instant::now());
        self.socket = None;
    }

    fn reply_ctcp(&mut self, msg: &Message) {
        let (Some(verb), Some(nick)) = (msg.ctcp(), msg.origin_nick()) else {
            return;
        };

        let body = match verb {
            ctcp::PING => Ctcp::new(verb, &msg.params().join(" ")).to_string(),
            ctcp::VERSION => Ctcp::new(verb, VERSION_REPLY).to_string(),
            ctcp::CLIENTINFO => {
                Ctcp::new(verb, &ctcp::ANSWERED.join(" ").to_ascii_uppercase()).to_string()
            }
            ctcp::TIME => Ctcp::new(verb, &chrono::Local::now().to_rfc2822()).to_string(),
            _ => return,
        };
        self.notice(nick, &body);
    }

    fn track(&mut self, event: &Event) {
        let Some(msg) = event.message() else { return };
        let Some(tracker) = self.tracker.as_mut() else {
            return;
        };

        for action in tracker.feed(&self.nickname, msg) {
            match action {
                StateAction::RequestModes(channel) => self.mode(&channel, None),
                StateAction::ModeChanged(change) => {
                    self.queue
                        .post(change.event_name(), vec![EventArg::Mode(change)]);
                }
                StateAction::SelfQuit => self.queue.post(EventName::DEAD, vec![]),
                StateAction::CaseMappingChanged(mapping) => {
                    self.log(
                        LogLevel::Debug,
                        &format!("casemapping is now {mapping}, registries cleared"),
                    );
                }
            }
        }
    }
}
