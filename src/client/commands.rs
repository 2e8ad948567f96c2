//! Outgoing commands. Everything here only queues; lines go out when the
//! socket is writable.

use super::Client;
use crate::command::Command;
use crate::event::{EventArg, EventName};

fn opt(s: Option<&str>) -> Option<String> {
    s.map(str::to_owned)
}

impl Client {
    /// Queue a typed command.
    pub fn send(&mut self, command: Command) {
        self.sendq.push_back(command.to_string());
    }

    /// Queue a line exactly as given, without its terminator.
    pub fn raw(&mut self, line: &str) {
        self.send(Command::Raw(line.to_owned()));
    }

    pub fn pass(&mut self, password: &str) {
        self.send(Command::PASS(password.to_owned()));
    }

    /// Ask for a new nickname. The tracked nickname changes once the server
    /// confirms.
    pub fn nick(&mut self, nickname: &str) {
        self.send(Command::NICK(nickname.to_owned()));
    }

    /// Queue `USER`. Registration sends this on its own.
    pub fn send_user(&mut self, username: &str, realname: &str) {
        self.send(Command::USER(
            username.to_owned(),
            "0".to_owned(),
            realname.to_owned(),
        ));
    }

    pub fn privmsg(&mut self, target: &str, text: &str) {
        self.send(Command::PRIVMSG(target.to_owned(), text.to_owned()));
    }

    pub fn notice(&mut self, target: &str, text: &str) {
        self.send(Command::NOTICE(target.to_owned(), text.to_owned()));
    }

    pub fn join(&mut self, channel: &str, key: Option<&str>) {
        self.send(Command::JOIN(channel.to_owned(), opt(key)));
    }

    pub fn part(&mut self, channel: &str, message: Option<&str>) {
        self.send(Command::PART(channel.to_owned(), opt(message)));
    }

    pub fn kick(&mut self, channel: &str, nickname: &str, reason: Option<&str>) {
        self.send(Command::KICK(
            channel.to_owned(),
            nickname.to_owned(),
            opt(reason),
        ));
    }

    /// Set a channel's topic, or ask for it with `None`.
    pub fn topic(&mut self, channel: &str, topic: Option<&str>) {
        self.send(Command::TOPIC(channel.to_owned(), opt(topic)));
    }

    /// Change or query modes on `target`. `modes` is sent verbatim, so it
    /// may carry its arguments: `"+o ferris"`.
    pub fn mode(&mut self, target: &str, modes: Option<&str>) {
        let modes = modes.filter(|m| !m.is_empty());
        self.send(Command::MODE(target.to_owned(), opt(modes)));
    }

    /// Change our own user modes.
    pub fn umode(&mut self, modes: &str) {
        let me = self.nickname.clone();
        self.mode(&me, Some(modes));
    }

    pub fn invite(&mut self, nickname: &str, channel: &str) {
        self.send(Command::INVITE(nickname.to_owned(), channel.to_owned()));
    }

    /// Queue a QUIT and stop once the current drain pass is over. Queued
    /// output is flushed before [`Client::io_loop`] returns.
    pub fn quit(&mut self, message: Option<&str>) {
        self.send(Command::QUIT(opt(message)));
        self.queue
            .post(EventName::EXIT, vec![EventArg::Text("quit".to_owned())]);
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::{client, sent};
    use crate::event::{Drain, EventQueue};

    #[test]
    fn test_outgoing_lines() {
        let mut c = client(false);
        c.nick("other");
        c.send_user("ident", "Real Name");
        c.pass("secret");
        c.join("#rust", Some("key"));
        c.part("#rust", None);
        c.kick("#rust", "troll", Some("bye now"));
        c.topic("#rust", None);
        c.topic("#rust", Some("new topic"));
        c.invite("friend", "#rust");
        c.notice("friend", "hi");
        c.raw("WHOIS friend");

        assert_eq!(
            sent(&mut c),
            [
                "NICK other",
                "USER ident 0 * :Real Name",
                "PASS secret",
                "JOIN #rust key",
                "PART #rust",
                "KICK #rust troll :bye now",
                "TOPIC #rust",
                "TOPIC #rust :new topic",
                "INVITE friend #rust",
                "NOTICE friend :hi",
                "WHOIS friend",
            ]
        );
    }

    #[test]
    fn test_modes() {
        let mut c = client(false);
        c.mode("#rust", None);
        c.mode("#rust", Some(""));
        c.mode("#rust", Some("+o ferris"));
        c.umode("+i");
        assert_eq!(
            sent(&mut c),
            ["MODE #rust", "MODE #rust", "MODE #rust +o ferris", "MODE bot +i"]
        );
    }

    #[test]
    fn test_quit_queues_then_exits() {
        let mut c = client(false);
        c.quit(Some("gone fishing"));
        assert_eq!(EventQueue::run(&mut c), Drain::Exit);
        assert_eq!(sent(&mut c), ["QUIT :gone fishing"]);
    }
}
