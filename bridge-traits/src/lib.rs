//! # Host Bridge Traits
//!
//! Capability contracts the playback core needs from its host.
//!
//! ## Overview
//!
//! The core never talks to a media framework, the system mixer or the
//! notification shade directly. Each of those is a trait defined here and
//! implemented per host (desktop shims live in `bridge-desktop`).
//!
//! ## Traits
//!
//! ### Playback
//! - [`MediaEngine`](playback::MediaEngine) - One opaque decode/render engine instance
//! - [`EngineFactory`](playback::EngineFactory) - Allocates engines bound to a callback listener
//!
//! ### Audio Output
//! - [`AudioSystem`](audio::AudioSystem) - Shared audio focus and stream volume
//!
//! ### Status Surface
//! - [`StatusSurface`](status::StatusSurface) - Persistent play/pause indicator with title and theme
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is missing:
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .engine_factory(factory)
//!     .audio_system(audio)
//!     .build()?; // Error::CapabilityMissing { capability: "StatusSurface", .. }
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Host
//! implementations should convert platform-specific failures into it and keep
//! the message actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so handles can be shared with the
//! core's service task. Engine and focus callbacks may fire from any thread.

pub mod audio;
pub mod error;
pub mod log;
pub mod playback;
pub mod status;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::{AudioSystem, FocusChange, FocusChangeListener, FocusGrant};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{
    EngineEvent, EngineFactory, EngineListener, MediaEngine, MediaSource, PlaybackState,
};
pub use status::{
    Color, StatusFrame, StatusSurface, StatusTheme, SurfaceControl, SurfaceControlHandler,
};
