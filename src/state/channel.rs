use std::collections::{BTreeSet, HashSet};

use crate::mode::ModeFlag;

/// A channel the client is on.
///
/// Members are held as folded user keys; look them up through the
/// [`Tracker`](super::Tracker) that owns both registries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub(super) name: String,
    pub(super) id: String,
    pub(super) modes: BTreeSet<ModeFlag>,
    pub(super) key: Option<String>,
    pub(super) limit: u32,
    pub(super) members: HashSet<String>,
}

impl Channel {
    pub(super) fn new(name: &str, id: String) -> Self {
        Self {
            name: name.to_owned(),
            id,
            modes: BTreeSet::new(),
            key: None,
            limit: 0,
            members: HashSet::new(),
        }
    }

    /// The name as first seen.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The folded registry key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Boolean and parameter modes currently set. Status and list modes
    /// never appear here.
    pub fn modes(&self) -> &BTreeSet<ModeFlag> {
        &self.modes
    }

    pub fn has_mode(&self, flag: ModeFlag) -> bool {
        self.modes.contains(&flag)
    }

    /// The channel key (`+k`), if one is set.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The user limit (`+l`), 0 when unlimited.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Folded keys of the users on this channel.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub(super) fn toggle(&mut self, flag: ModeFlag, set: bool) {
        if set {
            self.modes.insert(flag);
        } else {
            self.modes.remove(&flag);
        }
    }
}
