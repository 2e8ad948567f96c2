//! IRC case-mapping functions and a case-folding map.
//!
//! IRC compares nicknames and channel names case-insensitively, and some
//! servers also treat a few punctuation characters as case variants of
//! each other. The rule in effect is advertised through the `CASEMAPPING`
//! ISUPPORT token; until one arrives the `rfc1459` rule is assumed.

use std::collections::hash_map::{self, HashMap};
use std::fmt;
use std::str::FromStr;

/// A case-folding rule advertised by the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseMapping {
    /// ASCII lower-casing plus `{`→`[`, `}`→`]`, `|`→`\`, `^`→`~`.
    #[default]
    Rfc1459,
    /// Like [`CaseMapping::Rfc1459`] but `^` and `~` stay distinct.
    StrictRfc1459,
    /// Plain ASCII lower-casing.
    Ascii,
}

impl CaseMapping {
    /// Fold a single character.
    #[inline]
    pub const fn fold_char(self, c: char) -> char {
        match (self, c) {
            (_, 'A'..='Z') => (c as u8 + 32) as char,
            (CaseMapping::Ascii, _) => c,
            (_, '{') => '[',
            (_, '}') => ']',
            (_, '|') => '\\',
            (CaseMapping::Rfc1459, '^') => '~',
            _ => c,
        }
    }

    /// Fold a whole string into its registry key form.
    pub fn fold(self, s: &str) -> String {
        s.chars().map(|c| self.fold_char(c)).collect()
    }

    /// Compare two strings under this mapping.
    pub fn equals(self, a: &str, b: &str) -> bool {
        a.len() == b.len()
            && a.chars()
                .zip(b.chars())
                .all(|(ca, cb)| self.fold_char(ca) == self.fold_char(cb))
    }

    /// The ISUPPORT token value for this mapping.
    pub fn as_str(self) -> &'static str {
        match self {
            CaseMapping::Rfc1459 => "rfc1459",
            CaseMapping::StrictRfc1459 => "strict-rfc1459",
            CaseMapping::Ascii => "ascii",
        }
    }
}

impl FromStr for CaseMapping {
    type Err = UnknownCaseMapping;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rfc1459" => Ok(CaseMapping::Rfc1459),
            "strict-rfc1459" => Ok(CaseMapping::StrictRfc1459),
            "ascii" => Ok(CaseMapping::Ascii),
            _ => Err(UnknownCaseMapping(s.to_owned())),
        }
    }
}

impl fmt::Display for CaseMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a `CASEMAPPING` value is not one we know how to fold.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown casemapping: {0}")]
pub struct UnknownCaseMapping(pub String);

/// Fold a string using the RFC 1459 mapping.
pub fn irc_to_lower(s: &str) -> String {
    CaseMapping::Rfc1459.fold(s)
}

/// Compare two strings using the RFC 1459 mapping.
pub fn irc_eq(a: &str, b: &str) -> bool {
    CaseMapping::Rfc1459.equals(a, b)
}

/// A map whose string keys are folded with a [`CaseMapping`] on every access.
///
/// Both the channel and the user registry are `IrcMap`s, so `#Rust` and
/// `#rust` name the same entry.
#[derive(Clone, Debug)]
pub struct IrcMap<V> {
    mapping: CaseMapping,
    inner: HashMap<String, V>,
}

impl<V> Default for IrcMap<V> {
    fn default() -> Self {
        Self::new(CaseMapping::default())
    }
}

impl<V> IrcMap<V> {
    /// Create an empty map folding with `mapping`.
    pub fn new(mapping: CaseMapping) -> Self {
        Self {
            mapping,
            inner: HashMap::new(),
        }
    }

    /// The folding rule of this map.
    pub fn mapping(&self) -> CaseMapping {
        self.mapping
    }

    /// Fold `key` the way this map stores it.
    pub fn fold(&self, key: &str) -> String {
        self.mapping.fold(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.inner.get(&self.fold(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let key = self.fold(key);
        self.inner.get_mut(&key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(&self.fold(key))
    }

    /// Insert under the folded form of `key`, returning any previous value.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let key = self.fold(key);
        self.inner.insert(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let key = self.fold(key);
        self.inner.remove(&key)
    }

    /// Get the entry for `key`, inserting the result of `make` if absent.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let key = self.fold(key);
        self.inner.entry(key).or_insert_with(make)
    }

    pub fn retain(&mut self, f: impl FnMut(&String, &mut V) -> bool) {
        self.inner.retain(f);
    }

    /// Iterate `(folded key, value)` pairs.
    pub fn iter(&self) -> hash_map::Iter<'_, String, V> {
        self.inner.iter()
    }

    pub fn keys(&self) -> hash_map::Keys<'_, String, V> {
        self.inner.keys()
    }

    pub fn values(&self) -> hash_map::Values<'_, String, V> {
        self.inner.values()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
