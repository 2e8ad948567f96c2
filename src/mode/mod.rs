//! Channel mode strings.
//!
//! A mode line such as `+ov-k alice bob *` is turned into one
//! [`ModeChange`] per letter. Which letters consume a parameter depends on
//! the built-in RFC 1459 defaults plus whatever the server advertised in
//! ISUPPORT, so parsing always goes through a [`ServerSupport`].
//!
//! [`ServerSupport`]: crate::isupport::ServerSupport

mod parse;
mod types;

pub use self::parse::{classify, parse_mode_changes};
pub use self::types::{ModeChange, ModeClass, ModeFlag, Sign};
