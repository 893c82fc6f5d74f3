//! Terminal input parser.
//!
//! Turns a line typed by the user into an [`InputCommand`]. Lines starting
//! with `/` are slash-commands; anything else is a public message.

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Say { text: String },
    Msg { recipient: String, text: String },
    Login { username: String },
    Users,
    Help,
    Quit,
}

/// Parse one input line.
///
/// Returns `None` for blank input, unknown commands, and commands missing a
/// required argument. Command names are case-insensitive.
pub fn parse_input(input: &str) -> Option<InputCommand> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let Some(rest) = input.strip_prefix('/') else {
        return Some(InputCommand::Say {
            text: input.to_string(),
        });
    };

    let parts: Vec<&str> = rest.splitn(3, ' ').collect();
    let cmd = parts.first()?.to_lowercase();

    match cmd.as_str() {
        "msg" | "query" | "privmsg" => {
            let recipient = parts.get(1)?.to_string();
            let text = parts.get(2)?.trim().to_string();
            if recipient.is_empty() || text.is_empty() {
                return None;
            }
            Some(InputCommand::Msg { recipient, text })
        }
        "login" | "nick" => {
            let username = parts.get(1)?.trim().to_string();
            if username.is_empty() {
                return None;
            }
            Some(InputCommand::Login { username })
        }
        "users" | "who" => Some(InputCommand::Users),
        "help" | "h" => Some(InputCommand::Help),
        "quit" | "exit" => Some(InputCommand::Quit),
        _ => None,
    }
}

/// Parse a `host:port` or bare `host` address, using `default_port` when
/// the port is missing or invalid.
pub fn parse_address(addr: &str, default_port: u16) -> (String, u16) {
    if let Some(colon_pos) = addr.rfind(':') {
        let host = addr[..colon_pos].to_string();
        let port = addr[colon_pos + 1..].parse().unwrap_or(default_port);
        (host, port)
    } else {
        (addr.to_string(), default_port)
    }
}
