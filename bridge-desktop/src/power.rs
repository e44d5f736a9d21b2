//! Display and pointer shims.

use bridge_traits::{
    error::{BridgeError, Result},
    power::{DisplayRequest, PointerService},
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Stay-awake request tracked as a counter.
///
/// Desktop power management is left to the OS; this type only validates that
/// requests are balanced.
#[derive(Debug, Default)]
pub struct DesktopDisplayRequest {
    active: AtomicUsize,
}

impl DesktopDisplayRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding `request_active` calls.
    pub fn active_requests(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl DisplayRequest for DesktopDisplayRequest {
    fn request_active(&self) -> Result<()> {
        let count = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(count, "Display request activated");
        Ok(())
    }

    fn request_release(&self) -> Result<()> {
        let released = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match released {
            Ok(previous) => {
                debug!(count = previous - 1, "Display request released");
                Ok(())
            }
            Err(_) => {
                warn!("Display request released without an active request");
                Err(BridgeError::OperationFailed(
                    "no active display request to release".to_string(),
                ))
            }
        }
    }
}

/// Pointer visibility flag.
#[derive(Debug, Default)]
pub struct DesktopPointer {
    hidden: AtomicBool,
}

impl DesktopPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }
}

impl PointerService for DesktopPointer {
    fn hide_pointer(&self) {
        if !self.hidden.swap(true, Ordering::SeqCst) {
            debug!("Pointer hidden");
        }
    }

    fn restore_pointer(&self) {
        if self.hidden.swap(false, Ordering::SeqCst) {
            debug!("Pointer restored");
        }
    }
}
