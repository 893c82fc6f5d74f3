//! Terminal front-end helpers: input parsing and event printing.

pub mod commands;
pub mod printer;

pub use commands::{parse_address, parse_input, InputCommand};
pub use printer::ConsoleListener;
