//! The chat client: command sending, the background reader, and event
//! dispatch to listeners.

use super::connection::{Connection, ConnectionState};
use super::listener::{ChatListener, Listeners};
use crate::error::ChatError;
use crate::protocol::{parse_response, Command, Response};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A client for one chat server connection.
///
/// Wrap it in an [`Arc`] to share between the caller and the background
/// reader started by [`ChatClient::start_listening`].
pub struct ChatClient {
    connection: Connection,
    listeners: Arc<Listeners>,
    last_error: Mutex<Option<String>>,
    listening: AtomicBool,
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatClient {
    pub fn new() -> Self {
        let listeners = Arc::new(Listeners::default());
        Self {
            connection: Connection::new(listeners.clone()),
            listeners,
            last_error: Mutex::new(None),
            listening: AtomicBool::new(false),
        }
    }

    pub async fn connect(&self, host: &str, port: u16) -> bool {
        self.connection.connect(host, port).await
    }

    pub async fn disconnect(&self) {
        self.connection.disconnect().await;
    }

    pub fn is_connection_active(&self) -> bool {
        self.connection.is_active()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn add_listener(&self, listener: Arc<dyn ChatListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ChatListener>) {
        self.listeners.remove(listener);
    }

    /// The most recent protocol error reported by the server, or `""`.
    pub fn last_error(&self) -> String {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    /// Send `login <username>`.
    pub async fn try_login(&self, username: &str) -> Result<bool, ChatError> {
        self.send(Command::login(username)?).await
    }

    /// Send `msg <text>` to everyone.
    pub async fn send_public_message(&self, text: &str) -> Result<bool, ChatError> {
        self.send(Command::public_message(text)?).await
    }

    /// Send `privmsg <recipient> <text>`.
    pub async fn send_private_message(
        &self,
        recipient: &str,
        text: &str,
    ) -> Result<bool, ChatError> {
        self.send(Command::private_message(recipient, text)?).await
    }

    /// Ask the server for the current user list.
    pub async fn refresh_user_list(&self) -> Result<bool, ChatError> {
        self.send(Command::Users).await
    }

    /// Ask the server which commands it supports.
    pub async fn ask_supported_commands(&self) -> Result<bool, ChatError> {
        self.send(Command::Help).await
    }

    /// Validate and send one command. `Ok(false)` means nothing was sent.
    pub async fn send(&self, command: Command) -> Result<bool, ChatError> {
        command.validate()?;
        Ok(self.connection.send_line(&command.to_string()).await)
    }

    /// Spawn the background reader for the current connection.
    ///
    /// Returns `None` if a reader is already running.
    pub fn start_listening(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.listening.swap(true, Ordering::AcqRel) {
            warn!("reader already running");
            return None;
        }
        let client = Arc::clone(self);
        Some(tokio::spawn(async move {
            // Cleared on every exit path, unwinding included
            let _listening = ListeningGuard(&client.listening);
            client.parse_incoming().await;
        }))
    }

    /// Read and dispatch lines until the connection closes.
    async fn parse_incoming(&self) {
        info!("reader started");
        while self.connection.is_active() {
            let Some(line) = self.connection.read_line().await else {
                break;
            };
            self.handle_line(&line);
        }
        info!("reader stopped");
    }

    /// Parse one inbound line and notify listeners. Never fails: malformed
    /// lines are logged and dropped, and [`Listeners::notify`] contains
    /// listener panics.
    pub fn handle_line(&self, line: &str) {
        let response = match parse_response(line) {
            Ok(Some(response)) => response,
            Ok(None) => {
                debug!(line, "ignoring unrecognized response");
                return;
            }
            Err(error) => {
                warn!(line, %error, "malformed response");
                return;
            }
        };

        self.dispatch(&response);
    }

    fn dispatch(&self, response: &Response) {
        if let Some(text) = response.error_text() {
            self.set_last_error(text);
        }

        match response {
            Response::LoginOk { line } => {
                self.listeners.notify(|l| l.on_login_result(true, line));
            }
            Response::LoginErr { message } => {
                self.listeners.notify(|l| l.on_login_result(false, message));
            }
            Response::Users { usernames } => {
                self.listeners.notify(|l| l.on_user_list(usernames));
            }
            Response::Message(message) => {
                self.listeners.notify(|l| l.on_message_received(message));
            }
            Response::MessageErr { message } => {
                self.listeners.notify(|l| l.on_message_error(message));
            }
            Response::CommandErr { message } => {
                self.listeners.notify(|l| l.on_command_error(message));
            }
            Response::Supported { commands } => {
                self.listeners.notify(|l| l.on_supported_commands(commands));
            }
        }
    }

    fn set_last_error(&self, text: &str) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
    }
}

struct ListeningGuard<'a>(&'a AtomicBool);

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
