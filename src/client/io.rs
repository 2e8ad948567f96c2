//! Transport and the main loop.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use bytes::Buf;
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio::time::{sleep, timeout};

use super::{Client, ConnectionState};
use crate::command::Command;
use crate::error::Result;
use crate::event::{Drain, EventName, EventQueue};
use crate::log::LogLevel;
use crate::timer::Timers;

/// Bytes reserved in the receive buffer before each read.
const READ_SIZE: usize = 8192;

/// Bounds on how long one readiness wait may last.
const MIN_WAIT: Duration = Duration::from_millis(50);
const MAX_WAIT: Duration = Duration::from_secs(60);

/// How long pending output may take to drain on exit.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

enum Wake {
    Read,
    Write,
    Timeout,
    Failed(io::Error),
}

impl Client {
    /// Open the transport and queue registration.
    ///
    /// Only a config problem is returned. A transport failure is logged and
    /// posted as `dead`, so the loop retries after the reconnect delay.
    ///
    /// Registration uses the current nickname, so a nick picked after a
    /// collision is kept across reconnects.
    pub async fn connect(&mut self) -> Result<()> {
        self.config.validate()?;

        let (server, port) = (self.config.server.clone(), self.config.port);
        self.log(LogLevel::Info, &format!("connecting to {server}:{port}"));

        self.state = ConnectionState::Connecting;
        self.socket = None;
        self.dead_since = None;
        self.recvq.clear();
        self.sendq.clear();
        self.outbuf.clear();

        let stream = match open(&server, port, self.config.bind_to).await {
            Ok(stream) => stream,
            Err(e) => {
                self.log(
                    LogLevel::Info,
                    &format!("failed to connect to {server}:{port}: {e}"),
                );
                self.queue.post(EventName::DEAD, vec![]);
                return Ok(());
            }
        };

        if let Err(e) = enable_keepalive(&stream) {
            self.log(
                LogLevel::Warning,
                &format!("failed to enable TCP keepalive: {e}"),
            );
        }
        self.socket = Some(stream);
        self.state = ConnectionState::Registering;

        if let Some(password) = self.config.password.clone() {
            self.send(Command::PASS(password));
        }
        self.send(Command::NICK(self.nickname.clone()));
        self.send(Command::USER(
            self.config.username.clone(),
            "0".to_owned(),
            self.config.realname.clone(),
        ));
        Ok(())
    }

    /// Drive the client until an `exit` event is handled.
    ///
    /// Connects first if needed. Returns early only if the config cannot be
    /// used to connect; transport failures are retried forever.
    pub async fn io_loop(&mut self) -> Result<()> {
        loop {
            match self.state {
                ConnectionState::Dead => {
                    let waited = self.dead_since.map_or(Duration::ZERO, |t| t.elapsed());
                    if let Some(rest) = self.config.reconnect_delay.checked_sub(waited) {
                        sleep(rest).await;
                    }
                    self.state = ConnectionState::Disconnected;
                    self.connect().await?;
                }
                ConnectionState::Disconnected => self.connect().await?,
                _ => {}
            }

            Timers::fire_due(self, Instant::now());
            if EventQueue::run(self) == Drain::Exit {
                self.flush().await;
                return Ok(());
            }
            if self.state == ConnectionState::Dead {
                continue;
            }

            self.wait().await;
        }
    }

    /// Wait for socket readiness or the next timer, then post what happened.
    async fn wait(&mut self) {
        let Some(socket) = self.socket.as_ref() else {
            self.queue.post(EventName::DEAD, vec![]);
            return;
        };

        let limit = self
            .timers
            .until_next(Instant::now())
            .map_or(MAX_WAIT, |left| left.clamp(MIN_WAIT, MAX_WAIT));
        let want_write = self.has_output();

        let wake = tokio::select! {
            res = socket.readable() => res.map_or_else(Wake::Failed, |()| Wake::Read),
            res = socket.writable(), if want_write => {
                res.map_or_else(Wake::Failed, |()| Wake::Write)
            }
            _ = sleep(limit) => Wake::Timeout,
        };

        match wake {
            Wake::Read => self.queue.post(EventName::READ_READY, vec![]),
            Wake::Write => self.queue.post(EventName::WRITE_READY, vec![]),
            Wake::Timeout => {}
            Wake::Failed(e) => {
                self.log(LogLevel::Info, &format!("socket error: {e}"));
                self.lost();
            }
        }
    }

    /// One non-blocking read into the receive buffer.
    pub(super) fn read(&mut self) {
        let Some(socket) = self.socket.as_ref() else {
            return;
        };

        let buf = self.recvq.buf_mut();
        buf.reserve(READ_SIZE);
        match socket.try_read_buf(buf) {
            Ok(0) => {
                self.log(LogLevel::Info, "connection closed by server");
                self.lost();
            }
            Ok(_) => {
                let dropped = self.recvq.trim_overlong();
                if dropped > 0 {
                    self.log(
                        LogLevel::Warning,
                        &format!("discarded {dropped} bytes of an overlong line"),
                    );
                }
                if self.recvq.has_line() {
                    self.queue.post(EventName::RECVQ_READY, vec![]);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => {
                self.log(LogLevel::Info, &format!("read error: {e}"));
                self.lost();
            }
        }
    }

    /// Write queued lines until the queue is empty or the socket is full.
    pub(super) fn write(&mut self) {
        let Some(socket) = self.socket.as_ref() else {
            return;
        };

        loop {
            if self.outbuf.is_empty() {
                let Some(line) = self.sendq.pop_front() else {
                    return;
                };
                self.log(LogLevel::Debug, &format!("<- {line}"));
                self.outbuf.extend_from_slice(line.as_bytes());
                self.outbuf.extend_from_slice(b"\r\n");
            }

            match socket.try_write(&self.outbuf) {
                Ok(0) => return,
                Ok(n) => self.outbuf.advance(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) => {
                    self.log(LogLevel::Info, &format!("write error: {e}"));
                    self.lost();
                    return;
                }
            }
        }
    }

    pub(super) fn has_output(&self) -> bool {
        !self.outbuf.is_empty() || !self.sendq.is_empty()
    }

    /// Best-effort drain of pending output before returning from the loop.
    async fn flush(&mut self) {
        let flushed = timeout(FLUSH_TIMEOUT, async {
            while self.has_output() {
                let Some(socket) = self.socket.as_ref() else {
                    break;
                };
                if socket.writable().await.is_err() {
                    break;
                }
                self.write();
            }
        })
        .await;

        if flushed.is_err() {
            self.log(LogLevel::Warning, "gave up flushing output on exit");
        }
    }

    fn lost(&mut self) {
        self.socket = None;
        self.queue.post(EventName::DEAD, vec![]);
    }
}

/// Resolve the server and connect to the first address that accepts,
/// skipping addresses of the other family when bound to a local address.
async fn open(server: &str, port: u16, bind: Option<IpAddr>) -> io::Result<TcpStream> {
    let addrs = lookup_host((server, port)).await?;

    let mut last_err = None;
    for addr in addrs {
        if bind.is_some_and(|ip| ip.is_ipv4() != addr.is_ipv4()) {
            continue;
        }
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        if let Some(ip) = bind {
            socket.bind(SocketAddr::new(ip, 0))?;
        }
        match socket.connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no usable address for server")
    }))
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::log::NullLogger;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_partial_write_resumes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = TcpStream::connect(addr).await.unwrap();
        let (peer, _) = listener.accept().await.unwrap();

        let mut c = Client::new(ClientConfig::new("127.0.0.1", "bot").port(addr.port()));
        c.set_logger(NullLogger);
        c.socket = Some(stream);

        // Far more than the socket buffers hold while the peer is not reading.
        let body = "abcdefghijklmnopqrstuvwxyz".repeat(1 << 20);
        let long = format!("PRIVMSG #c :{body}");
        c.raw(&long);
        c.raw("PING :after");

        c.write();
        assert!(c.has_output());
        assert!(!c.outbuf.is_empty());

        let reader = tokio::spawn(async move {
            let mut peer = BufReader::new(peer);
            let mut got = Vec::new();
            for _ in 0..2 {
                let mut line = Vec::new();
                peer.read_until(b'\n', &mut line).await.unwrap();
                got.push(line);
            }
            got
        });

        while c.has_output() {
            c.socket.as_ref().unwrap().writable().await.unwrap();
            c.write();
        }
        assert!(c.socket.is_some());

        let got = reader.await.unwrap();
        assert_eq!(got[0], format!("{long}\r\n").into_bytes());
        assert_eq!(got[1], b"PING :after\r\n");
    }
}
