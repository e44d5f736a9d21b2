//! Live tiles, now-playing surfaces and toasts.

use crate::platform::PlatformSendSync;

/// Host notification surfaces.
///
/// All calls are fire-and-forget; rendering failures stay inside the host.
pub trait NotificationService: PlatformSendSync {
    /// Remove any now-playing state from tiles.
    fn clear_tiles(&self);

    /// Show `title` as the currently playing item.
    fn update_now_playing(&self, title: &str);

    /// Display a short, transient message.
    fn show_toast(&self, message: &str);
}
