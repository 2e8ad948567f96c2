//! Simple IRC bot example
//!
//! Connects, joins a channel, answers `!ping` and `!users`, reports op
//! changes, and leaves on `!quit`. Set `RUST_LOG=debug` to see the wire
//! traffic.
//!
//! ```text
//! cargo run --example simple_bot -- irc.libera.chat "#slirc-test"
//! ```

use std::time::Duration;

use slirc_client::{Client, ClientConfig, Event, Sign};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let server = args.next().unwrap_or_else(|| "irc.libera.chat".to_owned());
    let channel = args.next().unwrap_or_else(|| "#slirc-test".to_owned());

    let config = ClientConfig::new(server, "slirc_bot")
        .username("slirc")
        .realname("slirc-client example bot")
        .reconnect_delay(Duration::from_secs(15));
    let mut client = Client::stateful(config);

    let join = channel.clone();
    client.on("001", move |c: &mut Client, _: &Event| c.join(&join, None));

    client.on("PRIVMSG", |c: &mut Client, ev: &Event| {
        let Some(msg) = ev.message() else { return };
        if msg.is_ctcp() {
            return;
        }
        let (Some(nick), Some(target)) = (msg.origin_nick(), msg.target()) else {
            return;
        };
        let reply_to = if msg.to_channel() { target } else { nick };

        match msg.param(0) {
            Some("!ping") => c.privmsg(reply_to, &format!("{nick}: pong")),
            Some("!users") if msg.to_channel() => {
                let count = c.channel(target).map_or(0, |chan| chan.member_count());
                c.privmsg(reply_to, &format!("{count} users here"));
            }
            Some("!quit") => c.quit(Some("asked to leave")),
            _ => {}
        }
    });

    client.on("mode_oper", |_: &mut Client, ev: &Event| {
        let Some(change) = ev.mode() else { return };
        let who = change.param.as_deref().unwrap_or("?");
        match change.sign {
            Sign::Plus => println!("{who} is now an operator on {}", change.channel),
            Sign::Minus => println!("{who} is no longer an operator on {}", change.channel),
        }
    });

    client.on("dead", |_: &mut Client, _: &Event| {
        println!("connection lost, reconnecting shortly");
    });

    // Say hello every ten minutes while connected.
    client.schedule_repeating(Duration::from_secs(600), move |c: &mut Client| {
        if c.is_connected() {
            c.privmsg(&channel, "still here");
        }
    });

    client.io_loop().await?;
    Ok(())
}
