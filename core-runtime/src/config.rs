//! # Core Configuration Module
//!
//! Collects the host services the playback core depends on and validates them
//! before anything starts.
//!
//! ## Required Dependencies
//!
//! - `EngineProvider` - Creates native/platform/background engine instances
//! - `HistoryService` - Persists watched time
//! - `NavigationService` - Leaves the player when a session ends
//!
//! ## Dependencies with desktop defaults
//!
//! - `NotificationService` - Tiles and toasts (desktop: `LoggingNotifier`)
//! - `DisplayRequest` - Stay-awake lock (desktop: `DesktopDisplayRequest`)
//! - `PointerService` - Pointer hiding (desktop: `DesktopPointer`, otherwise optional)
//!
//! When the `desktop-shims` feature is enabled the defaults above are
//! injected if the host does not provide its own.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_provider(Arc::new(MyEngines::new()))
//!     .history(Arc::new(MyHistory::open()?))
//!     .navigation(Arc::new(MyNavigator))
//!     .notifications(Arc::new(MyTiles))
//!     .display_request(Arc::new(MyDisplayRequest))
//!     .enable_background_audio(true)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! Missing required services produce [`Error::CapabilityMissing`] naming the
//! service and how to provide it. Inconsistent feature flags produce
//! [`Error::Config`].

use crate::error::{Error, Result};
use bridge_traits::{
    DisplayRequest, EngineKind, EngineProvider, HistoryService, LoggerSink, NavigationService,
    NotificationService, PointerService,
};
use std::sync::Arc;

/// Host services and switches for one playback core instance.
#[derive(Clone)]
pub struct CoreConfig {
    pub engine_provider: Arc<dyn EngineProvider>,
    pub history: Arc<dyn HistoryService>,
    pub navigation: Arc<dyn NavigationService>,
    pub notifications: Arc<dyn NotificationService>,
    pub display_request: Arc<dyn DisplayRequest>,
    pub pointer: Option<Arc<dyn PointerService>>,
    /// Optional host log destination, consumed by `logging::init_logging`.
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    pub features: FeatureFlags,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("engine_provider", &"EngineProvider { ... }")
            .field("history", &"HistoryService { ... }")
            .field("navigation", &"NavigationService { ... }")
            .field("notifications", &"NotificationService { ... }")
            .field("display_request", &"DisplayRequest { ... }")
            .field("pointer", &self.pointer.as_ref().map(|_| "PointerService { ... }"))
            .field("logger_sink", &self.logger_sink.is_some())
            .field("features", &self.features)
            .finish()
    }
}

/// Optional behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    /// Route supported audio tracks to the background engine so playback
    /// survives the app being suspended. Requires a background engine.
    pub background_audio: bool,

    /// Hide the pointer over the video surface while playing. Requires a
    /// `PointerService`.
    pub hide_pointer_during_playback: bool,
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Check that feature flags are backed by the services they need.
    pub fn validate(&self) -> Result<()> {
        if !self.engine_provider.is_available(EngineKind::Native)
            && !self.engine_provider.is_available(EngineKind::Platform)
        {
            return Err(Error::Config(
                "EngineProvider offers neither a native nor a platform engine. \
                 At least one full playback engine is required."
                    .to_string(),
            ));
        }

        if self.features.background_audio
            && !self.engine_provider.is_available(EngineKind::BackgroundNative)
        {
            return Err(Error::Config(
                "Background audio enabled but the EngineProvider has no background engine. \
                 Disable the feature or provide a BackgroundBackend."
                    .to_string(),
            ));
        }

        if self.features.hide_pointer_during_playback && self.pointer.is_none() {
            return Err(Error::Config(
                "Pointer hiding enabled but no PointerService provided. \
                 Disable the feature or inject a PointerService implementation."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn capability_missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn default_notifications() -> Result<Arc<dyn NotificationService>> {
    Ok(Arc::new(bridge_desktop::LoggingNotifier::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_notifications() -> Result<Arc<dyn NotificationService>> {
    Err(capability_missing(
        "NotificationService",
        "NotificationService is required to clear tiles and surface failures. \
         Desktop: enable the 'desktop-shims' feature to use LoggingNotifier. \
         Mobile: inject the platform tile/toast adapter.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn default_display_request() -> Result<Arc<dyn DisplayRequest>> {
    Ok(Arc::new(bridge_desktop::DesktopDisplayRequest::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_display_request() -> Result<Arc<dyn DisplayRequest>> {
    Err(capability_missing(
        "DisplayRequest",
        "DisplayRequest is required to keep the screen on during playback. \
         Desktop: enable the 'desktop-shims' feature to use DesktopDisplayRequest. \
         Mobile: inject the platform display request adapter.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn default_pointer() -> Option<Arc<dyn PointerService>> {
    Some(Arc::new(bridge_desktop::DesktopPointer::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_pointer() -> Option<Arc<dyn PointerService>> {
    None
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    engine_provider: Option<Arc<dyn EngineProvider>>,
    history: Option<Arc<dyn HistoryService>>,
    navigation: Option<Arc<dyn NavigationService>>,
    notifications: Option<Arc<dyn NotificationService>>,
    display_request: Option<Arc<dyn DisplayRequest>>,
    pointer: Option<Arc<dyn PointerService>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    features: FeatureFlags,
}

impl CoreConfigBuilder {
    pub fn engine_provider(mut self, provider: Arc<dyn EngineProvider>) -> Self {
        self.engine_provider = Some(provider);
        self
    }

    pub fn history(mut self, history: Arc<dyn HistoryService>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn navigation(mut self, navigation: Arc<dyn NavigationService>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    pub fn notifications(mut self, notifications: Arc<dyn NotificationService>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn display_request(mut self, display: Arc<dyn DisplayRequest>) -> Self {
        self.display_request = Some(display);
        self
    }

    pub fn pointer(mut self, pointer: Arc<dyn PointerService>) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn enable_background_audio(mut self, enabled: bool) -> Self {
        self.features.background_audio = enabled;
        self
    }

    pub fn hide_pointer_during_playback(mut self, enabled: bool) -> Self {
        self.features.hide_pointer_during_playback = enabled;
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Resolve defaults, check required services and validate.
    pub fn build(self) -> Result<CoreConfig> {
        let engine_provider = self.engine_provider.ok_or_else(|| {
            capability_missing(
                "EngineProvider",
                "EngineProvider is required to create playback engines. \
                 Inject the host's engine factory with .engine_provider().",
            )
        })?;

        let history = self.history.ok_or_else(|| {
            capability_missing(
                "HistoryService",
                "HistoryService is required to persist watched time. \
                 Inject one with .history(); bridge-desktop ships InMemoryHistory for tests.",
            )
        })?;

        let navigation = self.navigation.ok_or_else(|| {
            capability_missing(
                "NavigationService",
                "NavigationService is required to leave the player when media ends. \
                 Inject the host's navigator with .navigation().",
            )
        })?;

        let notifications = match self.notifications {
            Some(n) => n,
            None => default_notifications()?,
        };

        let display_request = match self.display_request {
            Some(d) => d,
            None => default_display_request()?,
        };

        let pointer = self.pointer.or_else(default_pointer);

        let config = CoreConfig {
            engine_provider,
            history,
            navigation,
            notifications,
            display_request,
            pointer,
            logger_sink: self.logger_sink,
            features: self.features,
        };

        config.validate()?;
        Ok(config)
    }
}
