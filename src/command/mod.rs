//! Outgoing IRC commands.

mod serialize;
mod types;

pub use types::Command;
