//! Wire protocol: line tokenizer, outgoing commands, and inbound responses.

pub mod commands;
pub mod response;
pub mod splitter;

pub use commands::Command;
pub use response::{parse_response, Response, TextMessage};
pub use splitter::{Parts, SplitError, Splitter};
