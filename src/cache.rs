//! Most-recent message cache.

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::types::UserId;

/// Stores the most recent plain-text message seen from each user.
///
/// Every new message replaces the previous entry for that user wholesale;
/// entries are never evicted. Cheap to clone, all clones share one map.
#[derive(Debug, Clone, Default)]
pub struct LastMessageCache {
    entries: Arc<DashMap<UserId, String>>,
}

impl LastMessageCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the latest message text for a user.
    pub fn record(&self, user: UserId, text: impl Into<String>) {
        self.entries.insert(user, text.into());
    }

    /// Returns the most recent message text for a user, if any.
    #[must_use]
    pub fn last_for(&self, user: UserId) -> Option<String> {
        self.entries.get(&user).map(|entry| entry.value().clone())
    }

    /// Number of users with a cached message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
