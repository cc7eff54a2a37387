//! Recording transport double for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use teloxide::types::Recipient;

use super::transport::{MIN_MEDIA_GROUP_ITEMS, Transport, TransportError};
use crate::media::MediaItem;

/// One send observed by the recording transport.
#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Text { to: Recipient, text: String },
    Photo { to: Recipient, resource: String },
    Document { to: Recipient, resource: String },
    MediaGroup { to: Recipient, items: Vec<MediaItem> },
}

/// Transport double that records every send attempt.
///
/// `fail_next(n)` makes the next `n` attempts return an API error; the
/// counter decrements per attempt, so a failure reply sent afterwards still
/// goes through. Failed attempts are recorded too.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    fail_next: Arc<AtomicUsize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` send attempts fail.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Only the text payloads sent so far, in order.
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|message| match message {
                SentMessage::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of send attempts observed.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    fn attempt(&self, message: SentMessage) -> Result<(), TransportError> {
        self.sent.lock().push(message);

        let should_fail = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if should_fail {
            return Err(TransportError::Api("injected failure".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, to: Recipient, text: &str) -> Result<(), TransportError> {
        self.attempt(SentMessage::Text {
            to,
            text: text.to_owned(),
        })
    }

    async fn send_photo(&self, to: Recipient, resource: &str) -> Result<(), TransportError> {
        self.attempt(SentMessage::Photo {
            to,
            resource: resource.to_owned(),
        })
    }

    async fn send_document(&self, to: Recipient, resource: &str) -> Result<(), TransportError> {
        self.attempt(SentMessage::Document {
            to,
            resource: resource.to_owned(),
        })
    }

    async fn send_media_group(
        &self,
        to: Recipient,
        items: Vec<MediaItem>,
    ) -> Result<(), TransportError> {
        // Mirror the production guard so contract violations surface in tests.
        if items.len() < MIN_MEDIA_GROUP_ITEMS {
            return Err(TransportError::TooFewItems(items.len()));
        }
        self.attempt(SentMessage::MediaGroup { to, items })
    }
}
