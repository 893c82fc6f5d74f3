//! Inbound response parser.
//!
//! Classifies one server line by its command word and decodes the body.
//! Unknown words parse to `None`; a line the tokenizer cannot handle (empty,
//! or missing a required body) is a [`SplitError`].

use super::splitter::{SplitError, Splitter};

const COMMAND_WORD: usize = 1;
const BODY: usize = 2;

/// A chat message received from another user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub sender: String,
    pub is_private: bool,
    pub body: String,
}

/// A decoded server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `loginok`; carries the entire raw line.
    LoginOk { line: String },
    LoginErr { message: String },
    Users { usernames: Vec<String> },
    Message(TextMessage),
    MessageErr { message: String },
    CommandErr { message: String },
    /// `supported`; every token of the line, command word included.
    Supported { commands: Vec<String> },
}

impl Response {
    /// Error text for responses that report a protocol-level failure.
    pub fn error_text(&self) -> Option<&str> {
        match self {
            Response::LoginErr { message }
            | Response::MessageErr { message }
            | Response::CommandErr { message } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Parse one inbound line (without its line terminator).
pub fn parse_response(line: &str) -> Result<Option<Response>, SplitError> {
    let splitter = Splitter::whitespace();
    let parts = splitter.split(line, 2)?;
    let word = parts.part(COMMAND_WORD)?;

    let response = match word {
        "loginok" => Response::LoginOk {
            line: line.to_string(),
        },
        "loginerr" => Response::LoginErr {
            message: parts.part(BODY)?.to_string(),
        },
        "users" => Response::Users {
            usernames: splitter
                .all_parts(parts.part(BODY)?)?
                .into_iter()
                .map(String::from)
                .collect(),
        },
        "msg" => Response::Message(parse_text_message(&splitter, parts.part(BODY)?, false)?),
        "privmsg" => Response::Message(parse_text_message(&splitter, parts.part(BODY)?, true)?),
        "msgerr" => Response::MessageErr {
            message: parts.part(BODY)?.to_string(),
        },
        "cmderr" => Response::CommandErr {
            message: parts.part(BODY)?.to_string(),
        },
        "supported" => Response::Supported {
            commands: splitter
                .all_parts(line)?
                .into_iter()
                .map(String::from)
                .collect(),
        },
        _ => return Ok(None),
    };
    Ok(Some(response))
}

/// Decode a `<sender> <text>` body.
fn parse_text_message(
    splitter: &Splitter,
    body: &str,
    is_private: bool,
) -> Result<TextMessage, SplitError> {
    let parts = splitter.split(body, 2)?;
    Ok(TextMessage {
        sender: parts.part(COMMAND_WORD)?.to_string(),
        is_private,
        body: parts.part(BODY)?.to_string(),
    })
}
