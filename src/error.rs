use thiserror::Error;

/// Errors surfaced by the chat client API.
///
/// Connection and stream failures are not errors here: they show up as a
/// `false` result and a disconnect notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
