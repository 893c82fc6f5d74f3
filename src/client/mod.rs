//! Client side of the chat protocol: connection lifecycle, the background
//! reader, and listener notification.

pub mod chat;
pub mod connection;
pub mod listener;

pub use chat::ChatClient;
pub use connection::{Connection, ConnectionState, MAX_LINE_LEN};
pub use listener::{ChannelListener, ChatEvent, ChatListener, Listeners};
