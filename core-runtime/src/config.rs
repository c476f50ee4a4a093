//! # Core Configuration Module
//!
//! Provides configuration management for the audio service core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host capabilities and channel settings the playback
//! service needs. It enforces fail-fast validation so a missing capability is
//! reported at construction instead of on the first `Play`.
//!
//! ## Required Dependencies
//!
//! - `EngineFactory` - Allocates media engines (no default; always host supplied)
//! - `AudioSystem` - Audio focus + stream volume
//! - `StatusSurface` - Persistent playback indicator
//!
//! When the `desktop-shims` feature is enabled, `AudioSystem` and
//! `StatusSurface` fall back to the in-process desktop implementations if not
//! provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{ChannelConfig, CoreConfig};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_factory(Arc::new(MyEngineFactory))
//!     .audio_system(Arc::new(MyAudioSystem))
//!     .status_surface(Arc::new(MyNotification))
//!     .channel(ChannelConfig::named("music-player"))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No EngineFactory: fails with an actionable CapabilityMissing error
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing engine factory");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AudioSystem, EngineFactory, LoggerSink, StatusSurface};
use std::sync::Arc;

/// Default capacity of the facade -> core command queue.
pub const DEFAULT_COMMAND_CAPACITY: usize = 32;

/// Default capacity of the core -> facade ordered event queue.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Default per-subscriber buffer of the broadcast event bus.
pub const DEFAULT_BROADCAST_CAPACITY: usize = crate::events::DEFAULT_EVENT_BUFFER_SIZE;

/// Addressing and sizing of the command/event channel pair.
///
/// Replaces process-wide channel identifiers: every controller is constructed
/// with its own explicit name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Identifies this controller in logs and spans
    pub name: String,
    /// Bounded capacity of the command queue
    pub command_capacity: usize,
    /// Bounded capacity of the ordered event queue
    pub event_capacity: usize,
    /// Per-subscriber buffer of the broadcast bus
    pub broadcast_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::named("audio-service")
    }
}

impl ChannelConfig {
    /// Channel settings with default capacities.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }

    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Validates the channel settings
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("Channel name cannot be empty".to_string()));
        }

        if self.command_capacity == 0 || self.event_capacity == 0 || self.broadcast_capacity == 0 {
            return Err(Error::Config(
                "Channel capacities must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Core configuration for the audio service.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Media engine allocator (required)
    pub engine_factory: Arc<dyn EngineFactory>,

    /// Shared audio output: focus and stream volume (required)
    pub audio_system: Arc<dyn AudioSystem>,

    /// Persistent playback indicator (required)
    pub status_surface: Arc<dyn StatusSurface>,

    /// Host log pipeline (optional)
    pub logger_sink: Option<Arc<dyn LoggerSink>>,

    /// Command/event channel settings
    pub channel: ChannelConfig,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("engine_factory", &"EngineFactory { ... }")
            .field("audio_system", &"AudioSystem { ... }")
            .field("status_surface", &"StatusSurface { ... }")
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("channel", &self.channel)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.channel.validate()
    }
}

fn engine_factory_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "EngineFactory".to_string(),
        message: "EngineFactory implementation is required to create media engines. \
                 Inject the host's media framework adapter (e.g. an ExoPlayer or \
                 GStreamer wrapper) with .engine_factory()."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn audio_system_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "AudioSystem".to_string(),
        message: "AudioSystem implementation is required for audio focus and volume. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the in-process FocusRegistry. \
                 Mobile: inject the platform audio manager adapter."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn status_surface_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "StatusSurface".to_string(),
        message: "StatusSurface implementation is required to keep the playback notification in sync. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the tracing surface. \
                 Mobile: inject the platform notification adapter."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_audio_system() -> Result<Arc<dyn AudioSystem>> {
    use bridge_desktop::FocusRegistry;

    let audio: Arc<dyn AudioSystem> = Arc::new(FocusRegistry::global().client());
    Ok(audio)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_audio_system() -> Result<Arc<dyn AudioSystem>> {
    Err(audio_system_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_status_surface() -> Result<Arc<dyn StatusSurface>> {
    use bridge_desktop::TracingStatusSurface;

    let surface: Arc<dyn StatusSurface> = Arc::new(TracingStatusSurface::new());
    Ok(surface)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_status_surface() -> Result<Arc<dyn StatusSurface>> {
    Err(status_surface_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// The builder validates required dependencies and provides helpful error
/// messages.
#[derive(Default)]
pub struct CoreConfigBuilder {
    engine_factory: Option<Arc<dyn EngineFactory>>,
    audio_system: Option<Arc<dyn AudioSystem>>,
    status_surface: Option<Arc<dyn StatusSurface>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    channel: Option<ChannelConfig>,
}

impl CoreConfigBuilder {
    /// Sets the engine factory (required).
    pub fn engine_factory(mut self, factory: Arc<dyn EngineFactory>) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    /// Sets the audio system.
    ///
    /// Each controller should get its own handle; the handle carries the
    /// controller's focus registration.
    pub fn audio_system(mut self, audio: Arc<dyn AudioSystem>) -> Self {
        self.audio_system = Some(audio);
        self
    }

    /// Sets the status surface.
    pub fn status_surface(mut self, surface: Arc<dyn StatusSurface>) -> Self {
        self.status_surface = Some(surface);
        self
    }

    /// Sets the host logger sink (optional).
    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Sets the channel configuration.
    ///
    /// Default: [`ChannelConfig::default`]
    pub fn channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - Required bridges are missing
    /// - Channel settings are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let engine_factory = self
            .engine_factory
            .ok_or_else(engine_factory_missing_error)?;

        let audio_system = match self.audio_system {
            Some(audio) => audio,
            None => provide_default_audio_system()?,
        };

        let status_surface = match self.status_surface {
            Some(surface) => surface,
            None => provide_default_status_surface()?,
        };

        let config = CoreConfig {
            engine_factory,
            audio_system,
            status_surface,
            logger_sink: self.logger_sink,
            channel: self.channel.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}
