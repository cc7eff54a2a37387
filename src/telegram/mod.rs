//! Telegram transport module.
//!
//! Implements the outbound send interface over the Bot API, with rate
//! limiting delegated to the throttle adaptor.

mod client;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{TelegramSender, ThrottledBot};
pub use transport::{MIN_MEDIA_GROUP_ITEMS, Transport, TransportError};
