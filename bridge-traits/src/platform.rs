//! Threading bounds shared by every bridge trait.
//!
//! Engine callbacks arrive on backend-owned threads and collaborators are
//! shared between the dispatch queue and timer tasks, so every host object
//! must be `Send + Sync`.

/// Marker for host objects that may be shared across threads.
pub trait PlatformSendSync: Send + Sync {}

impl<T> PlatformSendSync for T where T: Send + Sync {}

/// Marker for host objects that may be moved across threads.
pub trait PlatformSend: Send {}

impl<T> PlatformSend for T where T: Send {}
