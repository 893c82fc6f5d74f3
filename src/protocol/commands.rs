//! Outgoing protocol commands.
//!
//! Each user intent maps to exactly one wire line. [`Command::validate`]
//! rejects arguments that would produce a malformed or ambiguous line.

use crate::error::ChatError;
use std::fmt;

/// A client-to-server command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String },
    PublicMessage { text: String },
    PrivateMessage { recipient: String, text: String },
    Users,
    Help,
}

impl Command {
    pub fn login(username: impl Into<String>) -> Result<Self, ChatError> {
        let cmd = Self::Login {
            username: username.into(),
        };
        cmd.validate()?;
        Ok(cmd)
    }

    pub fn public_message(text: impl Into<String>) -> Result<Self, ChatError> {
        let cmd = Self::PublicMessage { text: text.into() };
        cmd.validate()?;
        Ok(cmd)
    }

    pub fn private_message(
        recipient: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let cmd = Self::PrivateMessage {
            recipient: recipient.into(),
            text: text.into(),
        };
        cmd.validate()?;
        Ok(cmd)
    }

    /// The leading command word of the wire line.
    pub fn word(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::PublicMessage { .. } => "msg",
            Command::PrivateMessage { .. } => "privmsg",
            Command::Users => "users",
            Command::Help => "help",
        }
    }

    /// Check that every argument fits on a single protocol line.
    pub fn validate(&self) -> Result<(), ChatError> {
        match self {
            Command::Login { username } => check_name("username", username),
            Command::PublicMessage { text } => check_text(text),
            Command::PrivateMessage { recipient, text } => {
                check_name("recipient", recipient)?;
                check_text(text)
            }
            Command::Users | Command::Help => Ok(()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Login { username } => write!(f, "login {}", username),
            Command::PublicMessage { text } => write!(f, "msg {}", text),
            Command::PrivateMessage { recipient, text } => {
                write!(f, "privmsg {} {}", recipient, text)
            }
            Command::Users => f.write_str("users"),
            Command::Help => f.write_str("help"),
        }
    }
}

fn check_name(what: &str, name: &str) -> Result<(), ChatError> {
    if name.is_empty() {
        return Err(ChatError::InvalidArgument(format!("{} must not be empty", what)));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ChatError::InvalidArgument(format!(
            "{} must not contain whitespace",
            what
        )));
    }
    Ok(())
}

fn check_text(text: &str) -> Result<(), ChatError> {
    if text.is_empty() {
        return Err(ChatError::InvalidArgument("message text must not be empty".into()));
    }
    // A line break would smuggle a second command onto the wire
    if text.contains(['\r', '\n']) {
        return Err(ChatError::InvalidArgument(
            "message text must not contain line breaks".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_forms() {
        assert_eq!(Command::login("alice").unwrap().to_string(), "login alice");
        assert_eq!(
            Command::public_message("Hello world").unwrap().to_string(),
            "msg Hello world"
        );
        assert_eq!(
            Command::private_message("bob", "hi there").unwrap().to_string(),
            "privmsg bob hi there"
        );
        assert_eq!(Command::Users.to_string(), "users");
        assert_eq!(Command::Help.to_string(), "help");
    }

    #[test]
    fn test_word_matches_wire_prefix() {
        let commands = [
            Command::login("alice").unwrap(),
            Command::public_message("x").unwrap(),
            Command::private_message("bob", "x").unwrap(),
            Command::Users,
            Command::Help,
        ];
        for cmd in commands {
            assert!(cmd.to_string().starts_with(cmd.word()));
        }
    }

    #[test]
    fn test_rejects_empty_arguments() {
        assert!(matches!(Command::login(""), Err(ChatError::InvalidArgument(_))));
        assert!(matches!(Command::public_message(""), Err(ChatError::InvalidArgument(_))));
        assert!(matches!(
            Command::private_message("", "hi"),
            Err(ChatError::InvalidArgument(_))
        ));
        assert!(matches!(
            Command::private_message("bob", ""),
            Err(ChatError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_line_injection() {
        assert!(Command::public_message("hi\nlogin mallory").is_err());
        assert!(Command::private_message("bob", "hi\r\nusers").is_err());
        assert!(Command::login("al ice").is_err());
        assert!(Command::private_message("b\tob", "hi").is_err());
    }
}
