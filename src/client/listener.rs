//! Observer interface for chat events.
//!
//! UI code implements [`ChatListener`] and registers it with a
//! [`ChatClient`](super::ChatClient). Every method has a no-op default so a
//! listener only overrides what it cares about.

use crate::protocol::TextMessage;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::error;

/// Receives notifications about protocol events.
pub trait ChatListener: Send + Sync {
    fn on_login_result(&self, _success: bool, _message: &str) {}
    fn on_disconnect(&self) {}
    fn on_user_list(&self, _usernames: &[String]) {}
    fn on_message_received(&self, _message: &TextMessage) {}
    fn on_message_error(&self, _text: &str) {}
    fn on_command_error(&self, _text: &str) {}
    fn on_supported_commands(&self, _commands: &[String]) {}
}

/// An owned copy of one listener notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    LoginResult { success: bool, message: String },
    Disconnected,
    UserList { usernames: Vec<String> },
    MessageReceived(TextMessage),
    MessageError { text: String },
    CommandError { text: String },
    SupportedCommands { commands: Vec<String> },
}

/// Forwards every notification into an unbounded channel.
pub struct ChannelListener {
    event_tx: mpsc::UnboundedSender<ChatEvent>,
}

impl ChannelListener {
    pub fn new(event_tx: mpsc::UnboundedSender<ChatEvent>) -> Self {
        Self { event_tx }
    }

    fn forward(&self, event: ChatEvent) {
        // Receiver gone means nobody is interested any more
        let _ = self.event_tx.send(event);
    }
}

impl ChatListener for ChannelListener {
    fn on_login_result(&self, success: bool, message: &str) {
        self.forward(ChatEvent::LoginResult {
            success,
            message: message.to_string(),
        });
    }

    fn on_disconnect(&self) {
        self.forward(ChatEvent::Disconnected);
    }

    fn on_user_list(&self, usernames: &[String]) {
        self.forward(ChatEvent::UserList {
            usernames: usernames.to_vec(),
        });
    }

    fn on_message_received(&self, message: &TextMessage) {
        self.forward(ChatEvent::MessageReceived(message.clone()));
    }

    fn on_message_error(&self, text: &str) {
        self.forward(ChatEvent::MessageError {
            text: text.to_string(),
        });
    }

    fn on_command_error(&self, text: &str) {
        self.forward(ChatEvent::CommandError {
            text: text.to_string(),
        });
    }

    fn on_supported_commands(&self, commands: &[String]) {
        self.forward(ChatEvent::SupportedCommands {
            commands: commands.to_vec(),
        });
    }
}

/// The registered listeners, unique by identity.
#[derive(Default)]
pub struct Listeners {
    inner: Mutex<Vec<Arc<dyn ChatListener>>>,
}

impl Listeners {
    /// Register `listener`. Adding the same handle twice is a no-op.
    pub fn add(&self, listener: Arc<dyn ChatListener>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !inner.iter().any(|l| same_listener(l, &listener)) {
            inner.push(listener);
        }
    }

    /// Unregister `listener`. Unknown handles are ignored.
    pub fn remove(&self, listener: &Arc<dyn ChatListener>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.retain(|l| !same_listener(l, listener));
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke `notify` on every listener, in registration order.
    ///
    /// Works on a snapshot, so callbacks may add or remove listeners. A
    /// listener that panics is logged and skipped; the rest still run.
    pub fn notify(&self, notify: impl Fn(&dyn ChatListener)) {
        let snapshot: Vec<_> = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &snapshot {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| notify(listener.as_ref())));
            if delivered.is_err() {
                error!("listener panicked during notification");
            }
        }
    }
}

fn same_listener(a: &Arc<dyn ChatListener>, b: &Arc<dyn ChatListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
