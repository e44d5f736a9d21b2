//! Notification shim: desktop shells have no live tiles.

use bridge_traits::notification::NotificationService;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationService for LoggingNotifier {
    fn clear_tiles(&self) {
        info!("Tiles cleared");
    }

    fn update_now_playing(&self, title: &str) {
        info!(title, "Now playing");
    }

    fn show_toast(&self, message: &str) {
        info!(message, "Toast");
    }
}
