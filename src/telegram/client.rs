//! Telegram Bot API transport.

use async_trait::async_trait;
use teloxide::RequestError;
use teloxide::adaptors::Throttle;
use teloxide::prelude::*;
use teloxide::types::{
    InputFile, InputMedia, InputMediaAudio, InputMediaDocument, InputMediaPhoto, InputMediaVideo,
    Recipient,
};
use tracing::debug;
use url::Url;

use super::transport::{MIN_MEDIA_GROUP_ITEMS, Transport, TransportError};
use crate::media::{MediaItem, MediaKind};

/// Bot type with the throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Production transport speaking to the Telegram Bot API.
pub struct TelegramSender {
    bot: ThrottledBot,
}

impl TelegramSender {
    /// Creates a sender over a throttled bot.
    #[must_use]
    pub fn new(bot: ThrottledBot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramSender {
    async fn send_text(&self, to: Recipient, text: &str) -> Result<(), TransportError> {
        debug!("Sending text to {:?}", to);
        self.bot.send_message(to, text).await?;
        Ok(())
    }

    async fn send_photo(&self, to: Recipient, resource: &str) -> Result<(), TransportError> {
        debug!("Sending photo to {:?}", to);
        self.bot.send_photo(to, input_file(resource)).await?;
        Ok(())
    }

    async fn send_document(&self, to: Recipient, resource: &str) -> Result<(), TransportError> {
        debug!("Sending document to {:?}", to);
        self.bot.send_document(to, input_file(resource)).await?;
        Ok(())
    }

    async fn send_media_group(
        &self,
        to: Recipient,
        items: Vec<MediaItem>,
    ) -> Result<(), TransportError> {
        // The Bot API rejects groups below 2 items; fail before the wire.
        if items.len() < MIN_MEDIA_GROUP_ITEMS {
            return Err(TransportError::TooFewItems(items.len()));
        }

        debug!("Sending media group of {} items to {:?}", items.len(), to);
        let media: Vec<InputMedia> = items.iter().map(input_media).collect();
        self.bot.send_media_group(to, media).await?;
        Ok(())
    }
}

impl From<RequestError> for TransportError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::RetryAfter(secs) => Self::RetryAfter(secs.seconds()),
            RequestError::Network(e) => Self::Network(e.to_string()),
            RequestError::Io(e) => Self::Network(e.to_string()),
            other => Self::Api(other.to_string()),
        }
    }
}

/// Maps a user-supplied resource string onto a Bot API input file.
///
/// Anything that parses as a url is fetched by Telegram from that url;
/// everything else is treated as the file id of previously uploaded media.
fn input_file(resource: &str) -> InputFile {
    match Url::parse(resource) {
        Ok(url) => InputFile::url(url),
        Err(_) => InputFile::file_id(resource),
    }
}

/// Wraps a classified media item into the matching Bot API input type.
fn input_media(item: &MediaItem) -> InputMedia {
    let file = input_file(&item.url);
    match item.kind {
        MediaKind::Photo => InputMedia::Photo(InputMediaPhoto::new(file)),
        MediaKind::Video => InputMedia::Video(InputMediaVideo::new(file)),
        MediaKind::Audio => InputMedia::Audio(InputMediaAudio::new(file)),
        MediaKind::Document => InputMedia::Document(InputMediaDocument::new(file)),
    }
}

impl std::fmt::Debug for TelegramSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSender").finish_non_exhaustive()
    }
}
