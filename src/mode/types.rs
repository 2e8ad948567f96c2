use std::borrow::Cow;
use std::fmt;

/// Whether a mode is being set or unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    pub fn is_plus(self) -> bool {
        self == Sign::Plus
    }

    pub fn as_char(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

/// How a mode letter behaves, in the order letters are classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeClass {
    /// Per-user channel privilege (`o`, `v`, PREFIX letters). Takes a nickname.
    Status,
    /// Mask list (`b`, `e`, `I`, CHANMODES type A). Takes a mask, never stored.
    List,
    /// Always takes a parameter (`k`, CHANMODES type B).
    AlwaysParam,
    /// Takes a parameter only when set (`l`, CHANMODES type C).
    ParamOnSet,
    /// No parameter (`imnpst`, CHANMODES type D, anything unknown).
    Boolean,
}

/// A channel or status mode letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeFlag {
    Ban,
    Except,
    Invex,
    Oper,
    Voice,
    Limited,
    Keyed,
    InviteOnly,
    Moderated,
    NoExternal,
    Private,
    Secret,
    TopicLock,
    /// Any letter without a built-in meaning.
    Other(char),
}

impl ModeFlag {
    pub fn from_char(c: char) -> Self {
        match c {
            'b' => ModeFlag::Ban,
            'e' => ModeFlag::Except,
            'I' => ModeFlag::Invex,
            'o' => ModeFlag::Oper,
            'v' => ModeFlag::Voice,
            'l' => ModeFlag::Limited,
            'k' => ModeFlag::Keyed,
            'i' => ModeFlag::InviteOnly,
            'm' => ModeFlag::Moderated,
            'n' => ModeFlag::NoExternal,
            'p' => ModeFlag::Private,
            's' => ModeFlag::Secret,
            't' => ModeFlag::TopicLock,
            other => ModeFlag::Other(other),
        }
    }

    pub fn letter(self) -> char {
        match self {
            ModeFlag::Ban => 'b',
            ModeFlag::Except => 'e',
            ModeFlag::Invex => 'I',
            ModeFlag::Oper => 'o',
            ModeFlag::Voice => 'v',
            ModeFlag::Limited => 'l',
            ModeFlag::Keyed => 'k',
            ModeFlag::InviteOnly => 'i',
            ModeFlag::Moderated => 'm',
            ModeFlag::NoExternal => 'n',
            ModeFlag::Private => 'p',
            ModeFlag::Secret => 's',
            ModeFlag::TopicLock => 't',
            ModeFlag::Other(c) => c,
        }
    }

    /// The name used in `mode_<name>` events. Letters without a built-in
    /// meaning are named by the letter itself.
    pub fn name(self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            ModeFlag::Ban => "ban",
            ModeFlag::Except => "except",
            ModeFlag::Invex => "invex",
            ModeFlag::Oper => "oper",
            ModeFlag::Voice => "voice",
            ModeFlag::Limited => "limited",
            ModeFlag::Keyed => "keyed",
            ModeFlag::InviteOnly => "invite_only",
            ModeFlag::Moderated => "moderated",
            ModeFlag::NoExternal => "no_external",
            ModeFlag::Private => "private",
            ModeFlag::Secret => "secret",
            ModeFlag::TopicLock => "topic_lock",
            ModeFlag::Other(c) => return Cow::Owned(c.to_string()),
        })
    }
}

impl fmt::Display for ModeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One classified letter of a mode line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeChange {
    pub channel: String,
    pub flag: ModeFlag,
    pub sign: Sign,
    /// The parameter the letter consumed, if its class takes one and one
    /// was left.
    pub param: Option<String>,
    pub class: ModeClass,
}

impl ModeChange {
    /// `mode_<flag name>`, the event this change is posted under.
    pub fn event_name(&self) -> String {
        format!("mode_{}", self.flag.name())
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.channel, self.sign.as_char(), self.flag.letter())?;
        if let Some(param) = &self.param {
            write!(f, " {param}")?;
        }
        Ok(())
    }
}
