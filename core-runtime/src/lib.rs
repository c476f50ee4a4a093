//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the audio service:
//! - Logging and tracing infrastructure
//! - Configuration management with fail-fast capability checks
//! - Event bus for fanning out playback events
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the playback core and the host
//! façade depend on. It establishes the logging conventions and event
//! broadcasting mechanisms used throughout the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
