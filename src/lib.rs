//! Client for a line-oriented TCP chat protocol.
//!
//! - [`protocol`] holds the wire format: the line [`Splitter`], outgoing
//!   [`Command`]s, and the inbound [`Response`] parser.
//! - [`client`] owns the TCP connection, runs the background reader, and
//!   notifies registered [`ChatListener`]s.
//! - [`console`] parses terminal input and prints events.
//! - [`config`] loads the TOML configuration used by the terminal front-end.

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod protocol;

pub use client::{
    ChannelListener, ChatClient, ChatEvent, ChatListener, ConnectionState, MAX_LINE_LEN,
};
pub use error::ChatError;
pub use protocol::{Command, Response, SplitError, Splitter, TextMessage};
