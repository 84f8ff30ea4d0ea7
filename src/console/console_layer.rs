// Console layer - text commands in, formatted feed out.
//
// Same shape as any other presenter: parse input into primitives, call the
// core services, format the result. No business logic lives here.

pub mod commands;
pub mod formatter;
pub mod handler;

pub use commands::{parse_command, CommandError, ConsoleCommand};
pub use handler::{handle_command, Data, Error, Reply};
