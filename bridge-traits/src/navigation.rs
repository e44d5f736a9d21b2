//! Page navigation requests issued by the playback core.
//!
//! The core never renders pages; it only asks the host to move away from the
//! player when a session ends.

use crate::platform::PlatformSendSync;

pub trait NavigationService: PlatformSendSync {
    /// Whether there is a page to return to.
    fn can_go_back(&self) -> bool;
    fn go_back(&self);
    fn navigate_home(&self);
    fn navigate_to_library(&self);
}
