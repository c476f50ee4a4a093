//! # Playback Core
//!
//! A background audio-playback controller. One session owns at most one media
//! engine, negotiates shared audio focus with other producers, samples
//! position and buffering while playing, and keeps a persistent status
//! surface in sync with the playback state.
//!
//! ## Overview
//!
//! - [`PlayerHandle`]: cloneable facade; one async method per [`Command`]
//! - `service`: the single task that serialises commands and callbacks
//! - `controller`: the state machine (Initial, Stopped, Playing, Paused,
//!   Completed, Error)
//! - `engine`, `focus`, `progress`, `status`: the pieces the state machine
//!   drives
//!
//! Host capabilities (engine factory, audio system, status surface) come from
//! [`core_runtime::config::CoreConfig`]; events are published on
//! [`core_runtime::events::EventBus`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playback::{PlayRequest, PlayerConfig, PlayerHandle};
//!
//! let player = PlayerHandle::spawn(&core_config);
//! player.create(PlayerConfig::default()).await?;
//! player
//!     .play(PlayRequest::url("https://cdn.example.com/a.mp3").with_volume(0.8))
//!     .await?;
//! player.pause().await?;
//! player.destroy().await?;
//! ```

pub mod command;
pub mod config;
mod controller;
pub mod engine;
pub mod error;
pub mod focus;
mod handle;
mod progress;
mod service;
pub mod session;
mod signal;
pub mod status;

pub use command::{Command, CommandOutcome, PlayRequest, ThemeColors};
pub use config::{FocusResumePolicy, OptionsUpdate, PlayerConfig};
pub use controller::SessionSnapshot;
pub use engine::{select_source, EngineId, DEFAULT_USER_AGENT};
pub use error::{PlaybackError, Result};
pub use focus::FocusAction;
pub use handle::PlayerHandle;
pub use session::{parse_headers, SessionId};
pub use status::parse_color;
