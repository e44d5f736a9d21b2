//! In-process watched-time history.

use async_trait::async_trait;
use bridge_traits::{error::Result, history::HistoryService};
use core_async::sync::Mutex;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryEntry {
    token: String,
    elapsed: Duration,
}

/// History kept in memory, most recently updated entry first.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed time recorded for `token`.
    pub async fn elapsed(&self, token: &str) -> Option<Duration> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|e| e.token == token)
            .map(|e| e.elapsed)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl HistoryService for InMemoryHistory {
    async fn update_media_history(&self, token: &str, elapsed: Duration) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.retain(|e| e.token != token);
        entries.insert(
            0,
            HistoryEntry {
                token: token.to_string(),
                elapsed,
            },
        );
        debug!(elapsed_ms = elapsed.as_millis() as u64, "History updated");
        Ok(())
    }

    async fn token_at_position(&self, index: usize) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(index)
            .map(|e| e.token.clone()))
    }
}
