//! Outbound transport seam.

use async_trait::async_trait;
use teloxide::types::Recipient;
use thiserror::Error;

use crate::media::MediaItem;

/// Minimum number of items the transport accepts in one media group.
pub const MIN_MEDIA_GROUP_ITEMS: usize = 2;

/// Errors that can occur during outbound sends.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited, retry after {0} seconds")]
    RetryAfter(u32),

    #[error("Media group needs at least 2 items, got {0}")]
    TooFewItems(usize),
}

/// Narrow send interface the relay core depends on.
///
/// The production implementation speaks the Telegram Bot API; tests
/// substitute a recording double.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a plain text message.
    async fn send_text(&self, to: Recipient, text: &str) -> Result<(), TransportError>;

    /// Sends a single photo, given a url or file id.
    async fn send_photo(&self, to: Recipient, resource: &str) -> Result<(), TransportError>;

    /// Sends a single document, given a url or file id.
    async fn send_document(&self, to: Recipient, resource: &str) -> Result<(), TransportError>;

    /// Sends an ordered batch of media as one group.
    ///
    /// Fails with [`TransportError::TooFewItems`] for batches smaller than
    /// [`MIN_MEDIA_GROUP_ITEMS`], before anything goes on the wire.
    async fn send_media_group(
        &self,
        to: Recipient,
        items: Vec<MediaItem>,
    ) -> Result<(), TransportError>;
}
