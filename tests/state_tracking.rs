//! Channel and user tracking, driven by whole protocol lines.

use proptest::prelude::*;
use slirc_client::state::{StateAction, Tracker};
use slirc_client::{CaseMapping, Message, ModeFlag};

const ME: &str = "me";

fn feed(tracker: &mut Tracker, line: &str) -> Vec<StateAction> {
    let msg = Message::parse(line).unwrap();
    tracker.feed(ME, &msg)
}

/// Every channel's members know the channel and every user's channels know
/// the user. Nobody is tracked without a channel.
fn assert_consistent(tracker: &Tracker) -> Result<(), TestCaseError> {
    for chan in tracker.channels() {
        for member in chan.members() {
            let user = tracker.user(member);
            prop_assert!(user.is_some(), "{} lists unknown member {}", chan.name(), member);
            let user = user.unwrap();
            prop_assert!(user.channels().any(|c| c == chan.id()));
        }
    }
    for user in tracker.users() {
        prop_assert!(user.channels().next().is_some(), "{} has no channels", user.nickname());
        for id in user.channels() {
            let chan = tracker.channel(id);
            prop_assert!(chan.is_some(), "{} is on unknown {}", user.nickname(), id);
            prop_assert!(chan.unwrap().members().any(|m| m == user.id()));
        }
    }
    Ok(())
}

#[derive(Clone, Debug)]
enum Op {
    Join(usize, usize),
    Part(usize, usize),
    Kick(usize, usize),
    Nick(usize, usize),
    Quit(usize),
}

const NICKS: &[&str] = &["me", "Alice", "bob", "Carol", "d[a]ve", "D{A}VE"];
const CHANNELS: &[&str] = &["#rust", "#RUST", "&local", "#Ferris"];

fn op_strategy() -> impl Strategy<Value = Op> {
    let nick = 0..NICKS.len();
    let other = 1..NICKS.len();
    let chan = 0..CHANNELS.len();
    prop_oneof![
        3 => (nick.clone(), chan.clone()).prop_map(|(n, c)| Op::Join(n, c)),
        1 => (nick.clone(), chan.clone()).prop_map(|(n, c)| Op::Part(n, c)),
        1 => (nick, chan).prop_map(|(n, c)| Op::Kick(n, c)),
        1 => (other.clone(), other.clone()).prop_map(|(a, b)| Op::Nick(a, b)),
        1 => other.prop_map(Op::Quit),
    ]
}

fn line_for(op: &Op) -> String {
    match *op {
        Op::Join(n, c) => format!(":{}!u@h JOIN {}", NICKS[n], CHANNELS[c]),
        Op::Part(n, c) => format!(":{}!u@h PART {} :bye", NICKS[n], CHANNELS[c]),
        Op::Kick(n, c) => format!(":op!u@h KICK {} {} :out", CHANNELS[c], NICKS[n]),
        Op::Nick(a, b) => format!(":{}!u@h NICK :{}", NICKS[a], NICKS[b]),
        Op::Quit(n) => format!(":{}!u@h QUIT :gone", NICKS[n]),
    }
}

proptest! {
    #[test]
    fn membership_stays_symmetric(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut tracker = Tracker::new();
        for op in &ops {
            feed(&mut tracker, &line_for(op));
            assert_consistent(&tracker)?;
        }
    }

    #[test]
    fn channel_names_fold_together(suffix in "[a-z]{1,10}") {
        let mut tracker = Tracker::new();
        feed(&mut tracker, &format!(":me!u@h JOIN #{suffix}"));

        let upper = format!("#{}", suffix.to_ascii_uppercase());
        prop_assert!(tracker.channel(&upper).is_some());
        prop_assert_eq!(tracker.channels().count(), 1);
    }
}

#[test]
fn rfc1459_folding() {
    let map = CaseMapping::Rfc1459;
    assert_eq!(map.fold("#Test"), map.fold("#TEST"));
    assert_eq!(map.fold("{}|^"), "[]\\~");
    assert_eq!(map.fold("[]\\~"), "[]\\~");
    assert!(map.equals("Nick[away]", "nick{AWAY}"));

    let ascii = CaseMapping::Ascii;
    assert_eq!(ascii.fold("[Nick]"), "[nick]");
    assert!(!ascii.equals("[a]", "{a}"));
}

#[test]
fn channel_less_users_are_collected() {
    let mut tracker = Tracker::new();
    feed(&mut tracker, ":me!u@h JOIN #a");
    feed(&mut tracker, ":me!u@h JOIN #b");
    feed(&mut tracker, ":pal!u@h JOIN #a");
    feed(&mut tracker, ":pal!u@h JOIN #b");

    feed(&mut tracker, ":pal!u@h PART #a");
    assert!(tracker.user("pal").is_some());
    feed(&mut tracker, ":op!u@h KICK #b pal :bye");
    assert!(tracker.user("pal").is_none());
}

#[test]
fn join_scenario() {
    let mut tracker = Tracker::new();
    let actions = feed(&mut tracker, ":me!u@h JOIN #Rust");
    assert_eq!(actions, [StateAction::RequestModes("#Rust".to_owned())]);

    feed(&mut tracker, ":srv 353 me = #rust :@me +ferris crab");
    feed(&mut tracker, ":newbie!u@h JOIN #RUST");

    let chan = tracker.channel("#rust").unwrap();
    assert_eq!(chan.name(), "#Rust");
    // NAMES lists us too.
    assert_eq!(chan.member_count(), 4);

    let mut nicks: Vec<_> = tracker.members("#rust").map(|u| u.nickname().to_owned()).collect();
    nicks.sort();
    assert_eq!(nicks, ["crab", "ferris", "me", "newbie"]);

    assert!(tracker.status("ferris", "#rust").unwrap().contains(&ModeFlag::Voice));
    assert!(tracker.status("me", "#rust").unwrap().contains(&ModeFlag::Oper));
    assert!(tracker.status("crab", "#rust").map_or(true, |s| s.is_empty()));
}

#[test]
fn isupport_then_list_mode() {
    let mut tracker = Tracker::new();
    feed(
        &mut tracker,
        ":srv 005 me CHANMODES=beI,k,l,imnpst PREFIX=(ov)@+ CHANTYPES=#& :are supported by this server",
    );
    feed(&mut tracker, ":me!u@h JOIN #rust");
    feed(&mut tracker, ":spammer!u@h JOIN #rust");

    let actions = feed(&mut tracker, ":op!u@h MODE #rust +bn spammer!*@*");
    let names: Vec<_> = actions
        .iter()
        .map(|a| match a {
            StateAction::ModeChanged(change) => change.event_name(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(names, ["mode_ban", "mode_no_external"]);

    let chan = tracker.channel("#rust").unwrap();
    assert!(!chan.has_mode(ModeFlag::Ban));
    assert!(chan.has_mode(ModeFlag::NoExternal));
    // The ban mask is not a user and changes nobody's status.
    assert!(tracker
        .status("spammer", "#rust")
        .map_or(true, |s| s.is_empty()));
}

#[test]
fn prefix_modes_set_status_only() {
    let mut tracker = Tracker::new();
    feed(&mut tracker, ":srv 005 me PREFIX=(ov)@+ :are supported");
    feed(&mut tracker, ":me!u@h JOIN #c");
    feed(&mut tracker, ":nick1!u@h JOIN #c");
    feed(&mut tracker, ":nick2!u@h JOIN #c");
    feed(&mut tracker, ":op!u@h MODE #c +ov nick1 nick2");

    let chan = tracker.channel("#c").unwrap();
    assert!(chan.modes().is_empty());
    assert_eq!(
        tracker.status("nick1", "#c").unwrap().iter().collect::<Vec<_>>(),
        [&ModeFlag::Oper]
    );
    assert_eq!(
        tracker.status("nick2", "#c").unwrap().iter().collect::<Vec<_>>(),
        [&ModeFlag::Voice]
    );
}

#[test]
fn channel_key() {
    let mut tracker = Tracker::new();
    feed(&mut tracker, ":me!u@h JOIN #c");
    feed(&mut tracker, ":op!u@h MODE #c +k secret");
    let chan = tracker.channel("#c").unwrap();
    assert_eq!(chan.key(), Some("secret"));
    assert!(chan.has_mode(ModeFlag::Keyed));

    feed(&mut tracker, ":op!u@h MODE #c -k *");
    let chan = tracker.channel("#c").unwrap();
    assert_eq!(chan.key(), None);
    assert!(!chan.has_mode(ModeFlag::Keyed));
}
