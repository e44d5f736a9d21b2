//! Ordered playlist with a cursor.
//!
//! Navigation only moves the cursor; starting playback of the new current
//! item is the controller's job.

use crate::error::{PlaybackError, Result};
use crate::types::MediaDescriptor;
use serde::{Deserialize, Serialize};

/// Invariant: `cursor` is `Some(i)` with `i < items.len()` exactly when the
/// collection is non-empty.
#[derive(Debug, Clone, Default)]
pub struct TrackCollection {
    items: Vec<MediaDescriptor>,
    cursor: Option<usize>,
    is_running: bool,
}

/// Point-in-time view of a [`TrackCollection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub cursor: Option<usize>,
    pub len: usize,
    pub is_running: bool,
    pub can_go_next: bool,
    pub can_go_previous: bool,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents and place the cursor on `start`.
    pub fn set_items(&mut self, items: Vec<MediaDescriptor>, start: usize) -> Result<()> {
        if items.is_empty() {
            self.reset();
            return Ok(());
        }
        if start >= items.len() {
            return Err(PlaybackError::InvalidArgument(format!(
                "start index {start} out of range for {} items",
                items.len()
            )));
        }
        self.items = items;
        self.cursor = Some(start);
        Ok(())
    }

    /// Append an item. The first item added becomes current.
    pub fn add(&mut self, item: MediaDescriptor) {
        self.items.push(item);
        if self.cursor.is_none() {
            self.cursor = Some(0);
        }
    }

    pub fn current(&self) -> Option<&MediaDescriptor> {
        self.cursor.and_then(|i| self.items.get(i))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn can_go_next(&self) -> bool {
        self.cursor.is_some_and(|i| i + 1 < self.items.len())
    }

    pub fn can_go_previous(&self) -> bool {
        self.cursor.is_some_and(|i| i >= 1)
    }

    /// Advance the cursor if possible. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.cursor = self.cursor.map(|i| i + 1);
        true
    }

    /// Step the cursor back if possible. Returns whether it moved.
    pub fn previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.cursor = self.cursor.map(|i| i - 1);
        true
    }

    /// Jump to `index`. Out-of-range indices leave the cursor alone.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.cursor = Some(index);
        true
    }

    /// Empty, cursor-less and not running.
    pub fn reset(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.is_running = false;
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn set_running(&mut self, running: bool) {
        self.is_running = running;
    }

    pub fn items(&self) -> &[MediaDescriptor] {
        &self.items
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            cursor: self.cursor,
            len: self.items.len(),
            is_running: self.is_running,
            can_go_next: self.can_go_next(),
            can_go_previous: self.can_go_previous(),
        }
    }
}
