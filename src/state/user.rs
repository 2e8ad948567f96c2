use std::collections::{BTreeSet, HashMap, HashSet};

use crate::mode::ModeFlag;

/// A user seen on at least one of the client's channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub(super) nickname: String,
    pub(super) id: String,
    pub(super) channels: HashSet<String>,
    pub(super) status: HashMap<String, BTreeSet<ModeFlag>>,
}

impl User {
    pub(super) fn new(nickname: &str, id: String) -> Self {
        Self {
            nickname: nickname.to_owned(),
            id,
            channels: HashSet::new(),
            status: HashMap::new(),
        }
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// The folded registry key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Folded keys of the channels this user is on.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }

    /// Status modes held on the channel with folded key `channel`.
    pub fn status_on(&self, channel: &str) -> Option<&BTreeSet<ModeFlag>> {
        self.status.get(channel)
    }

    pub(super) fn join(&mut self, channel: &str) {
        self.channels.insert(channel.to_owned());
    }

    /// Leave a channel, dropping any status held there.
    pub(super) fn part(&mut self, channel: &str) {
        self.channels.remove(channel);
        self.status.remove(channel);
    }

    pub(super) fn set_status(&mut self, channel: &str, flag: ModeFlag, set: bool) {
        let modes = self.status.entry(channel.to_owned()).or_default();
        if set {
            modes.insert(flag);
        } else {
            modes.remove(&flag);
        }
    }
}
