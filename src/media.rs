//! Media classification for outbound sends.
//!
//! Maps a user-supplied resource locator onto the media kind the transport
//! should send it as. Classification is by extension only; anything
//! unrecognized falls back to a document.

/// Extensions classified as photos.
const PHOTO_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Extensions classified as videos.
const VIDEO_EXTENSIONS: [&str; 2] = [".mp4", ".avi"];

/// Extensions classified as audio.
const AUDIO_EXTENSIONS: [&str; 2] = [".mp3", ".wav"];

/// Kind of media a resource resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image.
    Photo,

    /// Video clip.
    Video,

    /// Audio track.
    Audio,

    /// Anything else, sent as a generic file.
    Document,
}

impl MediaKind {
    /// Classifies a resource locator by its extension.
    ///
    /// The match is case-insensitive; unrecognized extensions fall back to
    /// [`MediaKind::Document`], so classification never fails.
    #[must_use]
    pub fn classify(url: &str) -> Self {
        let lower = url.trim().to_lowercase();

        if PHOTO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            Self::Photo
        } else if VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            Self::Video
        } else if AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            Self::Audio
        } else {
            Self::Document
        }
    }

    /// Returns the kind name for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
        }
    }
}

/// A single entry of a media group: the resource and its classified kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Resource locator as supplied by the user.
    pub url: String,

    /// Kind derived from the url extension.
    pub kind: MediaKind,
}

impl MediaItem {
    /// Builds an item, classifying the url.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = MediaKind::classify(&url);
        Self { url, kind }
    }
}
