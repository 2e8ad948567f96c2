//! Error types for the IRC client.
//!
//! Only configuration problems are ever returned to the caller. Transport
//! failures become a `dead` event and malformed lines are dropped, so the
//! remaining types here exist mostly for logging.

use thiserror::Error;

/// Convenience type alias for Results using [`ConfigError`].
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// A required connection parameter is missing or unusable.
///
/// Returned synchronously from [`Client::connect`](crate::Client::connect)
/// and [`Client::io_loop`](crate::Client::io_loop).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A field that must be set before connecting is empty.
    #[error("need a {0} to connect")]
    MissingField(&'static str),

    /// The port is zero.
    #[error("invalid port: {0}")]
    InvalidPort(u16),
}

/// Errors encountered when parsing a protocol line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line was empty after stripping the terminator.
    #[error("empty message")]
    EmptyMessage,

    /// The line did not match the message grammar.
    #[error("invalid message at position {position}: {line:?}")]
    InvalidLine {
        /// The offending line.
        line: String,
        /// Byte offset where the grammar stopped matching.
        position: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::MissingField("nickname");
        assert_eq!(err.to_string(), "need a nickname to connect");

        let err = MessageParseError::InvalidLine {
            line: ":only-origin".to_string(),
            position: 12,
        };
        assert_eq!(
            err.to_string(),
            "invalid message at position 12: \":only-origin\""
        );
    }
}
