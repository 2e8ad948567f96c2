//! RPL_ISUPPORT (005) token parsing and the capability tables built from it.
//!
//! [`Isupport`] is a borrowed view over one 005 line. [`ServerSupport`] is
//! the owned table the state tracker keeps for the lifetime of a connection;
//! each 005 line is folded into it with [`ServerSupport::apply`].

use crate::casemap::CaseMapping;
use crate::message::Message;
use crate::response::Response;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    /// Split `KEY` / `KEY=VALUE` tokens, stopping at the first `:`-prefixed one.
    pub fn parse_params<S: AsRef<str>>(params: &'a [S]) -> Self {
        let mut entries = Vec::with_capacity(params.len());
        for p in params {
            let p = p.as_ref();
            if p.starts_with(':') {
                break;
            }
            if p.is_empty() {
                continue;
            }
            let (key, value) = match p.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (p, None),
            };
            entries.push(IsupportEntry { key, value });
        }
        Isupport { entries }
    }

    /// Tokens of a 005 message, or `None` for any other message.
    pub fn from_message(msg: &'a Message) -> Option<Self> {
        (msg.response() == Some(Response::RPL_ISUPPORT)).then(|| Self::parse_params(msg.params()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    /// The value of the last occurrence of `key`. `Some(None)` means the key
    /// was present without a value.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .rfind(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }

    pub fn casemapping(&self) -> Option<&'a str> {
        self.get("CASEMAPPING").flatten()
    }

    pub fn chantypes(&self) -> Option<&'a str> {
        self.get("CHANTYPES").flatten()
    }

    pub fn prefix(&self) -> Option<PrefixSpec<'a>> {
        self.get("PREFIX").flatten().and_then(PrefixSpec::parse)
    }

    pub fn chanmodes(&self) -> Option<ChanModes<'a>> {
        self.get("CHANMODES").flatten().and_then(ChanModes::parse)
    }
}

/// `PREFIX=(ov)@+`: mode letters positionally paired with status symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    pub modes: &'a str,
    pub prefixes: &'a str,
}

impl<'a> PrefixSpec<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        let inner = s.strip_prefix('(')?;
        let (modes, prefixes) = inner.split_once(')')?;
        if modes.is_empty() || prefixes.is_empty() {
            return None;
        }
        Some(PrefixSpec { modes, prefixes })
    }

    /// `(letter, symbol)` pairs in rank order.
    pub fn pairs(&self) -> impl Iterator<Item = (char, char)> + 'a {
        self.modes.chars().zip(self.prefixes.chars())
    }
}

/// `CHANMODES=A,B,C,D`. Extra comma-separated groups are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChanModes<'a> {
    pub a: &'a str,
    pub b: &'a str,
    pub c: &'a str,
    pub d: &'a str,
}

impl<'a> ChanModes<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        let mut parts = s.split(',');
        let (a, b, c, d) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        Some(ChanModes { a, b, c, d })
    }
}

/// Server-advertised channel mode classes, one string of letters per class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChanModeClasses {
    /// Type A: list modes, always take a parameter.
    pub list: String,
    /// Type B: always take a parameter.
    pub always: String,
    /// Type C: take a parameter only when set.
    pub on_set: String,
    /// Type D: never take a parameter.
    pub boolean: String,
}

/// Capability tables negotiated through ISUPPORT.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerSupport {
    casemapping: CaseMapping,
    chanmodes: ChanModeClasses,
    chantypes: String,
    prefix: Vec<(char, char)>,
}

impl Default for ServerSupport {
    fn default() -> Self {
        Self {
            casemapping: CaseMapping::default(),
            chanmodes: ChanModeClasses::default(),
            chantypes: "#&".to_owned(),
            prefix: Vec::new(),
        }
    }
}

impl ServerSupport {
    /// Fold one 005 line into the tables.
    ///
    /// Returns the new casemapping when it differs from the one in effect.
    /// Unknown keys and values that do not parse leave the tables untouched.
    pub fn apply(&mut self, isupport: &Isupport<'_>) -> Option<CaseMapping> {
        let mut changed = None;

        for entry in isupport.iter() {
            let Some(value) = entry.value else { continue };

            match entry.key.to_ascii_uppercase().as_str() {
                "CASEMAPPING" => {
                    if let Ok(mapping) = value.parse::<CaseMapping>() {
                        if mapping != self.casemapping {
                            self.casemapping = mapping;
                            changed = Some(mapping);
                        }
                    }
                }
                "CHANMODES" => {
                    if let Some(modes) = ChanModes::parse(value) {
                        self.chanmodes = ChanModeClasses {
                            list: modes.a.to_owned(),
                            always: modes.b.to_owned(),
                            on_set: modes.c.to_owned(),
                            boolean: modes.d.to_owned(),
                        };
                    }
                }
                "CHANTYPES" if !value.is_empty() => self.chantypes = value.to_owned(),
                "PREFIX" => {
                    if let Some(spec) = PrefixSpec::parse(value) {
                        for (letter, symbol) in spec.pairs() {
                            match self.prefix.iter_mut().find(|(l, _)| *l == letter) {
                                Some(slot) => slot.1 = symbol,
                                None => self.prefix.push((letter, symbol)),
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        changed
    }

    pub fn casemapping(&self) -> CaseMapping {
        self.casemapping
    }

    pub fn chanmodes(&self) -> &ChanModeClasses {
        &self.chanmodes
    }

    pub fn chantypes(&self) -> &str {
        &self.chantypes
    }

    /// `(letter, symbol)` pairs from PREFIX, in the order advertised.
    pub fn prefix(&self) -> &[(char, char)] {
        &self.prefix
    }

    /// Whether `name` starts with one of the advertised channel prefixes.
    pub fn is_channel(&self, name: &str) -> bool {
        name.chars()
            .next()
            .is_some_and(|c| self.chantypes.contains(c))
    }

    /// The mode letter behind a NAMES status symbol.
    pub fn status_letter(&self, symbol: char) -> Option<char> {
        self.prefix
            .iter()
            .find(|(_, s)| *s == symbol)
            .map(|(l, _)| *l)
            .or(match symbol {
                '@' => Some('o'),
                '+' => Some('v'),
                _ => None,
            })
    }

    pub fn is_status_symbol(&self, c: char) -> bool {
        self.status_letter(c).is_some()
    }

    pub fn is_status_letter(&self, letter: char) -> bool {
        self.prefix.iter().any(|(l, _)| *l == letter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        line.split(' ').map(str::to_owned).collect()
    }

    #[test]
    fn test_parse_stops_at_trailing() {
        let params = tokens("CHANTYPES=# EXCEPTS NICKLEN=30 :are supported by this server");
        let isupport = Isupport::parse_params(&params);
        assert_eq!(isupport.iter().count(), 3);
        assert_eq!(isupport.chantypes(), Some("#"));
        assert_eq!(isupport.get("EXCEPTS"), Some(None));
        assert_eq!(isupport.get("supported"), None);
    }

    #[test]
    fn test_prefix_spec() {
        let spec = PrefixSpec::parse("(qaohv)~&@%+").unwrap();
        let pairs: Vec<_> = spec.pairs().collect();
        assert_eq!(pairs[0], ('q', '~'));
        assert_eq!(pairs[4], ('v', '+'));
        assert!(PrefixSpec::parse("()").is_none());
        assert!(PrefixSpec::parse("@+").is_none());
    }

    #[test]
    fn test_chanmodes_requires_four_groups() {
        let modes = ChanModes::parse("beI,k,l,imnpst").unwrap();
        assert_eq!(modes.a, "beI");
        assert_eq!(modes.d, "imnpst");
        assert!(ChanModes::parse("b,k,l").is_none());
        assert_eq!(ChanModes::parse("b,k,l,imn,XYZ").unwrap().d, "imn");
    }

    #[test]
    fn test_apply_updates_tables() {
        let params = tokens("CHANMODES=b,k,l,imnpst PREFIX=(ov)@+ CHANTYPES=#&! CASEMAPPING=ascii");
        let mut support = ServerSupport::default();

        let changed = support.apply(&Isupport::parse_params(&params));
        assert_eq!(changed, Some(CaseMapping::Ascii));
        assert_eq!(support.chanmodes().list, "b");
        assert_eq!(support.chanmodes().boolean, "imnpst");
        assert_eq!(support.prefix(), [('o', '@'), ('v', '+')]);
        assert!(support.is_channel("!abc"));

        // Receiving the same mapping again is not a change.
        assert_eq!(support.apply(&Isupport::parse_params(&params)), None);
    }

    #[test]
    fn test_apply_ignores_garbage() {
        let params = tokens("CASEMAPPING=rfc7613 PREFIX=junk CHANMODES=x FOO=bar");
        let mut support = ServerSupport::default();
        assert_eq!(support.apply(&Isupport::parse_params(&params)), None);
        assert_eq!(support, ServerSupport::default());
    }

    #[test]
    fn test_prefix_overrides_and_appends() {
        let mut support = ServerSupport::default();
        support.apply(&Isupport::parse_params(&tokens("PREFIX=(ov)@+")));
        support.apply(&Isupport::parse_params(&tokens("PREFIX=(hv)%!")));
        assert_eq!(support.prefix(), [('o', '@'), ('v', '!'), ('h', '%')]);
        assert_eq!(support.status_letter('%'), Some('h'));
    }

    #[test]
    fn test_status_symbol_fallback() {
        let support = ServerSupport::default();
        assert!(support.is_channel("#rust"));
        assert!(!support.is_channel("nick"));
        assert_eq!(support.status_letter('@'), Some('o'));
        assert_eq!(support.status_letter('+'), Some('v'));
        assert_eq!(support.status_letter('%'), None);
    }
}
