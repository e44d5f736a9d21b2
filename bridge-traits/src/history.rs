//! Playback history persistence.

use crate::{error::Result, platform::PlatformSendSync};
use std::time::Duration;

/// Stores how far the user got into each piece of media.
///
/// Tokens are opaque host identifiers for a media file (for example a
/// future-access-list token). Position `0` is the most recently opened
/// entry.
#[async_trait::async_trait]
pub trait HistoryService: PlatformSendSync {
    /// Record the elapsed playback time for `token`.
    async fn update_media_history(&self, token: &str, elapsed: Duration) -> Result<()>;

    /// Token stored at `index` in the history list, if any.
    async fn token_at_position(&self, index: usize) -> Result<Option<String>>;
}
