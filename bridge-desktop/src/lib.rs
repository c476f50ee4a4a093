//! # Desktop Bridge Implementations
//!
//! Default implementations of the playback host capabilities for desktop
//! platforms (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - [`FocusRegistry`] / [`FocusClient`]: in-process audio focus arbitration
//!   between several producers, plus the shared output volume
//! - [`TracingStatusSurface`]: a status surface that logs what it would show
//!
//! Media engines are always supplied by the host.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FocusRegistry, TracingStatusSurface};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_factory(engine_factory)
//!     .audio_system(Arc::new(FocusRegistry::global().client()))
//!     .status_surface(Arc::new(TracingStatusSurface::new()))
//!     .build()?;
//! ```

mod focus;
mod surface;

pub use focus::{FocusClient, FocusRegistry};
pub use surface::TracingStatusSurface;
