//! TCP connection lifecycle.
//!
//! [`Connection`] owns the socket halves of one session. The session is held
//! as an `Option` behind a mutex: `Some` means connected. Tearing down takes
//! the session out of the mutex, so when an explicit disconnect races with
//! the reader noticing a dead stream only one of them gets the session, and
//! only that one releases it and fires the disconnect notification.

use super::listener::Listeners;
use std::borrow::Cow;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, info, warn};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// Longest inbound line accepted, terminator included. Longer lines are
/// dropped.
pub const MAX_LINE_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

struct Session {
    writer: AsyncMutex<OwnedWriteHalf>,
    reader: AsyncMutex<BufReader<OwnedReadHalf>>,
    shutdown: watch::Sender<bool>,
}

pub struct Connection {
    session: Mutex<Option<Arc<Session>>>,
    listeners: Arc<Listeners>,
}

impl Connection {
    pub fn new(listeners: Arc<Listeners>) -> Self {
        Self {
            session: Mutex::new(None),
            listeners,
        }
    }

    /// Open a TCP connection to `host:port`.
    ///
    /// Returns `false` on any I/O failure, leaving the connection
    /// disconnected, and also when a connection is already open.
    pub async fn connect(&self, host: &str, port: u16) -> bool {
        if self.is_active() {
            warn!(host, port, "connect requested while already connected");
            return false;
        }

        let stream = match TcpStream::connect((host, port)).await {
            Ok(stream) => stream,
            Err(error) => {
                warn!(host, port, %error, "could not connect to chat server");
                return false;
            }
        };

        let (reader, writer) = stream.into_split();
        let (shutdown, _) = watch::channel(false);
        let session = Arc::new(Session {
            writer: AsyncMutex::new(writer),
            reader: AsyncMutex::new(BufReader::new(reader)),
            shutdown,
        });

        let mut slot = self.lock_session();
        if slot.is_some() {
            // Lost a race against a concurrent connect; keep the winner
            warn!(host, port, "connect raced with another connect");
            return false;
        }
        *slot = Some(session);
        info!(host, port, "connected to chat server");
        true
    }

    pub fn is_active(&self) -> bool {
        self.lock_session().is_some()
    }

    pub fn state(&self) -> ConnectionState {
        if self.is_active() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Close the connection and notify listeners.
    ///
    /// Safe to call from several tasks at once: only the call that finds the
    /// connection open does any work. Calling it while disconnected is a
    /// no-op.
    pub async fn disconnect(&self) {
        let Some(session) = self.lock_session().take() else {
            return;
        };

        // Wakes a reader parked in read_line
        session.shutdown.send_replace(true);

        let mut writer = session.writer.lock().await;
        if let Err(error) = writer.shutdown().await {
            debug!(%error, "error shutting down write half");
        }
        drop(writer);
        drop(session);

        info!("disconnected from chat server");
        self.listeners.notify(|l| l.on_disconnect());
    }

    /// Write `text` followed by a newline and flush.
    ///
    /// Returns `false` without side effects when disconnected. A write
    /// failure closes the connection and also returns `false`.
    pub async fn send_line(&self, text: &str) -> bool {
        let Some(session) = self.current_session() else {
            return false;
        };

        let mut shutdown = session.shutdown.subscribe();

        // A write stalled on a full socket must not hold the writer past a
        // disconnect
        let result = tokio::select! {
            written = async {
                let mut writer = session.writer.lock().await;
                write_line(&mut writer, text).await
            } => Some(written),
            _ = shutdown.wait_for(|closed| *closed) => None,
        };
        drop(session);

        match result {
            None => {
                debug!("send abandoned, connection closed locally");
                false
            }
            Some(Ok(())) => {
                debug!(line = text, "sent");
                true
            }
            Some(Err(error)) => {
                warn!(%error, "write to chat server failed");
                self.disconnect().await;
                false
            }
        }
    }

    /// Wait for the next line from the server, without its line terminator.
    ///
    /// Returns `None` when disconnected. End of stream or a read error closes
    /// the connection before `None` is returned.
    pub async fn read_line(&self) -> Option<String> {
        let session = self.current_session()?;
        let mut shutdown = session.shutdown.subscribe();

        let mut buf = Vec::new();
        let result = {
            let mut reader = session.reader.lock().await;
            tokio::select! {
                read = read_next_line(&mut *reader, &mut buf, MAX_LINE_LEN) => Some(read),
                _ = shutdown.wait_for(|closed| *closed) => None,
            }
        };
        drop(session);

        match result {
            // Closed locally while waiting
            None => None,
            Some(Ok(false)) => {
                info!("chat server closed the connection");
                self.disconnect().await;
                None
            }
            Some(Ok(true)) => {
                let decoded = String::from_utf8_lossy(&buf);
                if let Cow::Owned(_) = decoded {
                    warn!("received line with invalid UTF-8, replacing bad bytes");
                }
                let line = decoded.trim_end_matches(LINE_ENDINGS).to_string();
                debug!(line = %line, "received");
                Some(line)
            }
            Some(Err(error)) => {
                warn!(%error, "read from chat server failed");
                self.disconnect().await;
                None
            }
        }
    }

    fn current_session(&self) -> Option<Arc<Session>> {
        self.lock_session().clone()
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Arc<Session>>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read the next line into `buf` as raw bytes, dropping any line longer than
/// `max_len`. Returns `false` at end of stream.
async fn read_next_line<R>(reader: &mut R, buf: &mut Vec<u8>, max_len: usize) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        buf.clear();
        let n = (&mut *reader)
            .take(max_len as u64)
            .read_until(b'\n', buf)
            .await?;
        if n == 0 {
            return Ok(false);
        }
        if buf.last() == Some(&b'\n') || buf.len() < max_len {
            return Ok(true);
        }

        warn!(max_len, "dropping oversized line");
        if !discard_through_newline(reader).await? {
            return Ok(false);
        }
    }
}

/// Skip input up to and including the next newline. Returns `false` if the
/// stream ended first.
async fn discard_through_newline<R>(reader: &mut R) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(false);
        }
        let newline = available.iter().position(|&b| b == b'\n');
        let len = available.len();
        match newline {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(true);
            }
            None => reader.consume(len),
        }
    }
}

async fn write_line(writer: &mut OwnedWriteHalf, text: &str) -> io::Result<()> {
    let mut encoded = Vec::with_capacity(text.len() + 1);
    encoded.extend_from_slice(text.as_bytes());
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await
}
