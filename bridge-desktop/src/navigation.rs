//! Navigation shim for headless and single-window desktop shells.

use bridge_traits::navigation::NavigationService;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Logs navigation requests and tracks how deep the back stack is.
#[derive(Debug, Default)]
pub struct LoggingNavigator {
    depth: AtomicUsize,
}

impl LoggingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `depth` pages behind the player.
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth: AtomicUsize::new(depth),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }
}

impl NavigationService for LoggingNavigator {
    fn can_go_back(&self) -> bool {
        self.depth() > 0
    }

    fn go_back(&self) {
        let _ = self
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1));
        info!(depth = self.depth(), "Navigate back");
    }

    fn navigate_home(&self) {
        self.depth.store(0, Ordering::SeqCst);
        info!("Navigate home");
    }

    fn navigate_to_library(&self) {
        self.depth.fetch_add(1, Ordering::SeqCst);
        info!("Navigate to library");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_stack_depth() {
        let nav = LoggingNavigator::with_depth(1);
        assert!(nav.can_go_back());
        nav.go_back();
        assert!(!nav.can_go_back());
        nav.go_back();
        assert_eq!(nav.depth(), 0);
        nav.navigate_to_library();
        assert_eq!(nav.depth(), 1);
        nav.navigate_home();
        assert_eq!(nav.depth(), 0);
    }
}
