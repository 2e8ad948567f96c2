//! Sans-IO channel and user tracking.
//!
//! [`Tracker`] owns the channel and user registries plus the ISUPPORT
//! tables, and keeps them consistent as messages are fed in. It does no
//! I/O itself: anything the caller must act on (asking the server for a
//! channel's modes, announcing a mode change, noticing our own QUIT) comes
//! back as a [`StateAction`].
//!
//! Channels and users never own each other. Each side stores the other's
//! folded registry key, and every mutation updates both sides before
//! returning. A user left with no channels is dropped in the same call.
//!
//! ```
//! use slirc_client::state::Tracker;
//!
//! let mut tracker = Tracker::new();
//! tracker.feed("me", &":me!u@h JOIN #rust".parse().unwrap());
//! tracker.feed("me", &":ferris!u@h JOIN #rust".parse().unwrap());
//!
//! let chan = tracker.channel("#RUST").unwrap();
//! assert_eq!(chan.member_count(), 1);
//! assert!(tracker.user("Ferris").is_some());
//! ```

mod channel;
mod user;

use std::collections::BTreeSet;

pub use self::channel::Channel;
pub use self::user::User;

use crate::casemap::{CaseMapping, IrcMap};
use crate::isupport::{Isupport, ServerSupport};
use crate::message::Message;
use crate::mode::{parse_mode_changes, ModeChange, ModeClass, ModeFlag};
use crate::response::Response;

/// Work the caller has to do after feeding a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateAction {
    /// We joined this channel; ask the server for its modes.
    RequestModes(String),
    /// A mode letter was classified (and applied, if it is tracked).
    ModeChanged(ModeChange),
    /// We quit; the connection is as good as dead.
    SelfQuit,
    /// The casemapping changed and both registries were emptied.
    CaseMappingChanged(CaseMapping),
}

/// Channel and user registries for one connection.
#[derive(Clone, Debug, Default)]
pub struct Tracker {
    channels: IrcMap<Channel>,
    users: IrcMap<User>,
    support: ServerSupport,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update state from one message. `me` is our current nickname.
    ///
    /// Messages the tracker does not care about are ignored.
    pub fn feed(&mut self, me: &str, msg: &Message) -> Vec<StateAction> {
        if let Some(resp) = msg.response() {
            return match resp {
                Response::RPL_ISUPPORT => self.handle_isupport(msg),
                Response::RPL_CHANNELMODEIS => self.handle_channel_mode_is(msg),
                Response::RPL_NAMREPLY => {
                    self.handle_names(msg);
                    vec![]
                }
                _ => vec![],
            };
        }

        match msg.command() {
            "JOIN" => self.handle_join(me, msg),
            "PART" => {
                if let (Some(nick), Some(chan)) = (msg.origin_nick(), msg.target()) {
                    self.leave(me, chan, nick);
                }
                vec![]
            }
            "KICK" => {
                if let (Some(victim), Some(chan)) = (msg.param(0), msg.target()) {
                    self.leave(me, chan, victim);
                }
                vec![]
            }
            "NICK" => {
                if let (Some(old), Some(new)) = (msg.origin_nick(), msg.target()) {
                    self.rename(old, new);
                }
                vec![]
            }
            "QUIT" => self.handle_quit(me, msg),
            "MODE" => self.handle_mode(msg),
            _ => vec![],
        }
    }

    /// Forget everything, including the ISUPPORT tables.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(nick)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// The users on `channel`, in no particular order.
    pub fn members<'a>(&'a self, channel: &str) -> impl Iterator<Item = &'a User> + 'a {
        self.channels
            .get(channel)
            .into_iter()
            .flat_map(|c| c.members.iter())
            .filter_map(|key| self.users.get(key))
    }

    /// Status modes `nick` holds on `channel`.
    pub fn status(&self, nick: &str, channel: &str) -> Option<&BTreeSet<ModeFlag>> {
        let chan = self.channels.fold(channel);
        self.users.get(nick)?.status_on(&chan)
    }

    pub fn support(&self) -> &ServerSupport {
        &self.support
    }

    pub fn casemapping(&self) -> CaseMapping {
        self.support.casemapping()
    }

    fn is_me(&self, me: &str, nick: &str) -> bool {
        self.casemapping().equals(me, nick)
    }

    fn handle_isupport(&mut self, msg: &Message) -> Vec<StateAction> {
        let Some(isupport) = Isupport::from_message(msg) else {
            return vec![];
        };
        match self.support.apply(&isupport) {
            Some(mapping) => {
                self.channels = IrcMap::new(mapping);
                self.users = IrcMap::new(mapping);
                vec![StateAction::CaseMappingChanged(mapping)]
            }
            None => vec![],
        }
    }

    fn handle_join(&mut self, me: &str, msg: &Message) -> Vec<StateAction> {
        let (Some(nick), Some(chan)) = (msg.origin_nick(), msg.target()) else {
            return vec![];
        };

        if self.is_me(me, nick) {
            let id = self.channels.fold(chan);
            self.channels
                .get_or_insert_with(chan, || Channel::new(chan, id));
            return vec![StateAction::RequestModes(chan.to_owned())];
        }

        self.add_member(chan, nick);
        vec![]
    }

    fn handle_quit(&mut self, me: &str, msg: &Message) -> Vec<StateAction> {
        let Some(nick) = msg.origin_nick() else {
            return vec![];
        };
        if self.is_me(me, nick) {
            return vec![StateAction::SelfQuit];
        }

        if let Some(user) = self.users.remove(nick) {
            for chan in &user.channels {
                if let Some(channel) = self.channels.get_mut(chan) {
                    channel.members.remove(&user.id);
                }
            }
        }
        vec![]
    }

    fn handle_mode(&mut self, msg: &Message) -> Vec<StateAction> {
        let Some(chan) = msg.target() else {
            return vec![];
        };
        if !self.support.is_channel(chan) {
            return vec![];
        }
        let Some((modes, args)) = msg.params().split_first() else {
            return vec![];
        };
        self.apply_modes(chan, modes, args)
    }

    fn handle_channel_mode_is(&mut self, msg: &Message) -> Vec<StateAction> {
        match msg.params() {
            [chan, modes, args @ ..] => self.apply_modes(chan, modes, args),
            _ => vec![],
        }
    }

    /// Parse `modes` against the negotiated tables and apply what is
    /// tracked: status letters go to the named user, boolean and parameter
    /// letters to the channel, list letters nowhere.
    fn apply_modes(&mut self, chan: &str, modes: &str, args: &[String]) -> Vec<StateAction> {
        let modes = modes.trim_start_matches(':');
        let changes = parse_mode_changes(&self.support, chan, modes, args);
        let chan_id = self.channels.fold(chan);

        for change in &changes {
            let set = change.sign.is_plus();
            match change.class {
                ModeClass::Status => {
                    let Some(nick) = change.param.as_deref() else {
                        continue;
                    };
                    if !self.channels.contains_key(chan) {
                        continue;
                    }
                    if let Some(user) = self.users.get_mut(nick) {
                        if user.channels.contains(&chan_id) {
                            user.set_status(&chan_id, change.flag, set);
                        }
                    }
                }
                ModeClass::List => {}
                ModeClass::AlwaysParam | ModeClass::ParamOnSet | ModeClass::Boolean => {
                    let Some(channel) = self.channels.get_mut(chan) else {
                        continue;
                    };
                    channel.toggle(change.flag, set);
                    match change.flag {
                        ModeFlag::Keyed => {
                            channel.key = if set { change.param.clone() } else { None };
                        }
                        ModeFlag::Limited => {
                            channel.limit = match (set, change.param.as_deref()) {
                                (true, Some(n)) => n.parse().unwrap_or(0),
                                _ => 0,
                            };
                        }
                        _ => {}
                    }
                }
            }
        }

        changes.into_iter().map(StateAction::ModeChanged).collect()
    }

    /// RPL_NAMREPLY: `<me> <type> <channel> :[prefix]nick ...`
    ///
    /// Only the first status symbol of an entry is honoured; any further
    /// ones are stripped along with it.
    fn handle_names(&mut self, msg: &Message) {
        let [_, chan, names @ ..] = msg.params() else {
            return;
        };
        if !self.channels.contains_key(chan) {
            return;
        }
        let chan_id = self.channels.fold(chan);

        for (i, entry) in names.iter().enumerate() {
            let entry = if i == 0 {
                entry.strip_prefix(':').unwrap_or(entry)
            } else {
                entry.as_str()
            };

            let nick = entry.trim_start_matches(|c: char| self.support.is_status_symbol(c));
            if nick.is_empty() {
                continue;
            }
            let status = if nick.len() < entry.len() {
                entry
                    .chars()
                    .next()
                    .and_then(|sym| self.support.status_letter(sym))
            } else {
                None
            };

            let nick = nick.to_owned();
            self.add_member(chan, &nick);
            if let (Some(letter), Some(user)) = (status, self.users.get_mut(&nick)) {
                user.set_status(&chan_id, ModeFlag::from_char(letter), true);
            }
        }
    }

    /// Record `nick` on `chan` on both sides, creating the user if needed.
    fn add_member(&mut self, chan: &str, nick: &str) {
        let Some(channel) = self.channels.get_mut(chan) else {
            return;
        };
        let user_id = self.users.fold(nick);
        channel.members.insert(user_id.clone());
        let chan_id = channel.id.clone();

        self.users
            .get_or_insert_with(nick, || User::new(nick, user_id))
            .join(&chan_id);
    }

    /// PART or KICK of `nick` from `chan`.
    fn leave(&mut self, me: &str, chan: &str, nick: &str) {
        if self.is_me(me, nick) {
            self.drop_channel(chan);
        } else {
            self.remove_member(chan, nick);
        }
    }

    fn remove_member(&mut self, chan: &str, nick: &str) {
        let chan_id = self.channels.fold(chan);
        let user_id = self.users.fold(nick);

        if let Some(channel) = self.channels.get_mut(chan) {
            channel.members.remove(&user_id);
        }
        let gone = match self.users.get_mut(nick) {
            Some(user) => {
                user.part(&chan_id);
                user.channels.is_empty()
            }
            None => false,
        };
        if gone {
            self.users.remove(nick);
        }
    }

    /// Forget a channel we left, along with users only seen there.
    fn drop_channel(&mut self, chan: &str) {
        let Some(channel) = self.channels.remove(chan) else {
            return;
        };
        for member in &channel.members {
            if let Some(user) = self.users.get_mut(member) {
                user.part(&channel.id);
            }
        }
        self.users.retain(|_, user| !user.channels.is_empty());
    }

    /// Re-key a user under a new nickname, on both sides.
    fn rename(&mut self, old: &str, new: &str) {
        let Some(mut user) = self.users.remove(old) else {
            return;
        };

        // A stale entry already holding the new nick loses its memberships.
        if let Some(stale) = self.users.remove(new) {
            for chan in &stale.channels {
                if let Some(channel) = self.channels.get_mut(chan) {
                    channel.members.remove(&stale.id);
                }
            }
        }

        let new_id = self.users.fold(new);
        for chan in &user.channels {
            if let Some(channel) = self.channels.get_mut(chan) {
                channel.members.remove(&user.id);
                channel.members.insert(new_id.clone());
            }
        }
        user.nickname = new.to_owned();
        user.id = new_id;
        self.users.insert(new, user);
    }
}
