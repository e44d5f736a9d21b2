//! Exclusive platform resources held while media plays.

use crate::{error::Result, platform::PlatformSendSync};

/// Keeps the display from dimming or locking.
///
/// Requests are reference counted by the host, so every successful
/// `request_active` must be balanced by exactly one `request_release`.
pub trait DisplayRequest: PlatformSendSync {
    fn request_active(&self) -> Result<()>;
    fn request_release(&self) -> Result<()>;
}

/// Controls pointer visibility over the video surface.
pub trait PointerService: PlatformSendSync {
    fn hide_pointer(&self);
    fn restore_pointer(&self);
}
