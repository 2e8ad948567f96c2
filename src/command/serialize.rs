use std::fmt::{self, Write};

use super::types::Command;

/// Write a command with arguments directly to a formatter.
/// The last argument is treated as trailing and gets a `:` prefix if needed.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    let Some((trailing, middle)) = args.split_last() else {
        return f.write_str(cmd);
    };

    f.write_str(cmd)?;
    for param in middle {
        f.write_char(' ')?;
        f.write_str(param)?;
    }
    f.write_char(' ')?;

    if trailing.is_empty() || trailing.contains(' ') || trailing.starts_with(':') {
        f.write_char(':')?;
    }
    f.write_str(trailing)
}

/// Write a command with a freeform (always colon-prefixed) trailing argument.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    match args.split_last() {
        Some((suffix, middle)) => {
            f.write_str(cmd)?;
            for arg in middle {
                f.write_char(' ')?;
                f.write_str(arg)?;
            }
            f.write_str(" :")?;
            f.write_str(suffix)
        }
        None => f.write_str(cmd),
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PASS(p) => write_cmd(f, "PASS", &[p]),
            Command::NICK(n) => write_cmd(f, "NICK", &[n]),
            Command::USER(u, m, r) => write_cmd_freeform(f, "USER", &[u, m, "*", r]),
            Command::QUIT(Some(m)) => write_cmd_freeform(f, "QUIT", &[m]),
            Command::QUIT(None) => f.write_str("QUIT"),
            Command::PONG(t) => write_cmd(f, "PONG", &[t]),
            Command::JOIN(c, Some(k)) => write_cmd(f, "JOIN", &[c, k]),
            Command::JOIN(c, None) => write_cmd(f, "JOIN", &[c]),
            Command::PART(c, Some(m)) => write_cmd_freeform(f, "PART", &[c, m]),
            Command::PART(c, None) => write_cmd(f, "PART", &[c]),
            Command::MODE(t, Some(modes)) if !modes.is_empty() => write!(f, "MODE {t} {modes}"),
            Command::MODE(t, _) => write_cmd(f, "MODE", &[t]),
            Command::TOPIC(c, Some(t)) => write_cmd_freeform(f, "TOPIC", &[c, t]),
            Command::TOPIC(c, None) => write_cmd(f, "TOPIC", &[c]),
            Command::INVITE(n, c) => write_cmd(f, "INVITE", &[n, c]),
            Command::KICK(c, n, Some(r)) => write_cmd_freeform(f, "KICK", &[c, n, r]),
            Command::KICK(c, n, None) => write_cmd(f, "KICK", &[c, n]),
            Command::PRIVMSG(t, m) => write_cmd_freeform(f, "PRIVMSG", &[t, m]),
            Command::NOTICE(t, m) => write_cmd_freeform(f, "NOTICE", &[t, m]),
            Command::Raw(line) => f.write_str(line),
        }
    }
}
