//! Prints chat events to the terminal.

use crate::client::ChatListener;
use crate::protocol::TextMessage;
use chrono::Local;

/// A [`ChatListener`] that writes one timestamped line per event to stdout.
pub struct ConsoleListener {
    timestamp_format: String,
}

impl ConsoleListener {
    pub fn new(timestamp_format: impl Into<String>) -> Self {
        Self {
            timestamp_format: timestamp_format.into(),
        }
    }

    fn print(&self, line: &str) {
        println!("[{}] {}", Local::now().format(&self.timestamp_format), line);
    }
}

impl ChatListener for ConsoleListener {
    fn on_login_result(&self, success: bool, message: &str) {
        if success {
            self.print("*** logged in");
        } else {
            self.print(&format!("!!! login failed: {}", message));
        }
    }

    fn on_disconnect(&self) {
        self.print("*** disconnected from server");
    }

    fn on_user_list(&self, usernames: &[String]) {
        self.print(&format!("*** online: {}", usernames.join(", ")));
    }

    fn on_message_received(&self, message: &TextMessage) {
        self.print(&format_message(message));
    }

    fn on_message_error(&self, text: &str) {
        self.print(&format!("!!! message not delivered: {}", text));
    }

    fn on_command_error(&self, text: &str) {
        self.print(&format!("!!! command error: {}", text));
    }

    fn on_supported_commands(&self, commands: &[String]) {
        // The first token is the `supported` response word itself
        let names = commands.get(1..).unwrap_or_default();
        self.print(&format!("*** server supports: {}", names.join(" ")));
    }
}

fn format_message(message: &TextMessage) -> String {
    if message.is_private {
        format!("*{}* {}", message.sender, message.body)
    } else {
        format!("<{}> {}", message.sender, message.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let mut message = TextMessage {
            sender: "root".into(),
            is_private: false,
            body: "Hello world".into(),
        };
        assert_eq!(format_message(&message), "<root> Hello world");
        message.is_private = true;
        assert_eq!(format_message(&message), "*root* Hello world");
    }
}
