//! Command handling module.
//!
//! Parses inbound messages, routes commands through the registry and runs
//! the built-in relay handlers.

mod handler;
mod registry;
mod types;

pub use handler::{CommandDispatcher, RelayContext};
pub use registry::{CommandRegistry, Handler, HandlerFuture, HandlerResult};
pub use types::{Command, HandlerError, Inbound, TextMessage, UserRef, parse_recipient};
