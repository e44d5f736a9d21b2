//! Stay-awake lock and pointer visibility, held exactly while playing.

use bridge_traits::{DisplayRequest, PointerService};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Holder of the exclusive resources tied to the `Playing` state.
///
/// `acquire` and `release` are idempotent, so every transition path can
/// call `release` unconditionally. Dropping the guard releases as well.
pub struct ResourceGuard {
    display: Arc<dyn DisplayRequest>,
    pointer: Option<Arc<dyn PointerService>>,
    held: bool,
    display_held: bool,
}

impl ResourceGuard {
    /// `pointer` is only driven when present.
    pub fn new(display: Arc<dyn DisplayRequest>, pointer: Option<Arc<dyn PointerService>>) -> Self {
        Self {
            display,
            pointer,
            held: false,
            display_held: false,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn acquire(&mut self) {
        if self.held {
            return;
        }
        match self.display.request_active() {
            Ok(()) => self.display_held = true,
            Err(e) => warn!(error = %e, "Display request failed; screen may dim during playback"),
        }
        if let Some(pointer) = &self.pointer {
            pointer.hide_pointer();
        }
        self.held = true;
        debug!("Playback resources acquired");
    }

    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        if std::mem::take(&mut self.display_held) {
            if let Err(e) = self.display.request_release() {
                warn!(error = %e, "Display release failed");
            }
        }
        if let Some(pointer) = &self.pointer {
            pointer.restore_pointer();
        }
        debug!("Playback resources released");
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ResourceGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceGuard")
            .field("held", &self.held)
            .field("display_held", &self.display_held)
            .field("pointer", &self.pointer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::BridgeError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
        fail_active: bool,
    }

    impl Recorder {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    impl DisplayRequest for Recorder {
        fn request_active(&self) -> bridge_traits::error::Result<()> {
            self.calls.lock().push("active");
            if self.fail_active {
                return Err(BridgeError::OperationFailed("denied".into()));
            }
            Ok(())
        }

        fn request_release(&self) -> bridge_traits::error::Result<()> {
            self.calls.lock().push("release");
            Ok(())
        }
    }

    impl PointerService for Recorder {
        fn hide_pointer(&self) {
            self.calls.lock().push("hide");
        }

        fn restore_pointer(&self) {
            self.calls.lock().push("restore");
        }
    }

    #[test]
    fn acquire_and_release_are_idempotent() {
        let rec = Arc::new(Recorder::default());
        let mut guard = ResourceGuard::new(rec.clone(), Some(rec.clone()));

        guard.acquire();
        guard.acquire();
        assert!(guard.is_held());
        guard.release();
        guard.release();
        assert!(!guard.is_held());

        assert_eq!(rec.calls(), vec!["active", "hide", "release", "restore"]);
    }

    #[test]
    fn drop_releases() {
        let rec = Arc::new(Recorder::default());
        {
            let mut guard = ResourceGuard::new(rec.clone(), None);
            guard.acquire();
        }
        assert_eq!(rec.calls(), vec!["active", "release"]);
    }

    #[test]
    fn failed_display_request_is_not_released() {
        let rec = Arc::new(Recorder {
            fail_active: true,
            ..Default::default()
        });
        let mut guard = ResourceGuard::new(rec.clone(), Some(rec.clone()));
        guard.acquire();
        guard.release();
        assert_eq!(rec.calls(), vec!["active", "hide", "restore"]);
    }
}
