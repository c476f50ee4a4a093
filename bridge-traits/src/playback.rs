//! Media engine bridge traits and supporting playback types.
//!
//! These abstractions let the playback core drive one opaque media engine
//! instance (decode + render) without knowing how the host implements it.
//! Engines report terminal conditions (ready, ended, error) through an
//! [`EngineListener`] supplied at creation time; the core turns those
//! callbacks into ordered messages for its own serial loop.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Playback state exposed to observers.
///
/// The core only ever holds an engine handle in [`PlaybackState::Playing`] or
/// [`PlaybackState::Paused`]; every other state has released it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum PlaybackState {
    /// No session activity yet (or the session was destroyed).
    Initial,
    Stopped,
    Playing,
    Paused,
    /// The current source played to its end.
    Completed,
    /// The engine reported a failure.
    Error(String),
}

impl PlaybackState {
    /// Numeric status code used by host command surfaces.
    pub fn code(&self) -> i32 {
        match self {
            PlaybackState::Initial => -1,
            PlaybackState::Stopped => 0,
            PlaybackState::Playing => 1,
            PlaybackState::Paused => 2,
            PlaybackState::Completed => 3,
            PlaybackState::Error(_) => 4,
        }
    }

    /// Whether a track is loaded (playing or paused mid-track).
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }

    /// Whether a `Play` command starts a fresh load from this state.
    pub fn is_idle(&self) -> bool {
        !self.is_active()
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Initial
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Initial => write!(f, "initial"),
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Completed => write!(f, "completed"),
            PlaybackState::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Source descriptor handed to [`MediaEngine::load_source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Remote HTTP(S) source fetched by a network-capable loader.
    Network {
        url: String,
        headers: HashMap<String, String>,
        user_agent: String,
    },
    /// Anything else (local path, content URI, asset); loaded without headers.
    Generic { url: String },
}

impl MediaSource {
    /// The URL this source points at.
    pub fn url(&self) -> &str {
        match self {
            MediaSource::Network { url, .. } | MediaSource::Generic { url } => url,
        }
    }

    /// Determine whether the source represents remote content.
    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::Network { .. })
    }
}

/// Terminal and lifecycle notifications raised by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine finished preparing and knows the source duration.
    Ready,
    /// Playback reached the end of the source.
    Ended,
    /// Decode, network or source failure.
    Error(String),
}

/// Callback registered with an engine when it is created.
///
/// Engines may invoke this from any thread; implementations must not block.
pub trait EngineListener: Send + Sync {
    fn on_event(&self, event: EngineEvent);
}

/// Opaque handle to one media engine instance.
///
/// Mutating operations are fire-and-forget from the caller's perspective:
/// their eventual outcome arrives through the [`EngineListener`].
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    /// Attach a source. Replaces any previously loaded source.
    async fn load_source(&self, source: MediaSource) -> Result<()>;

    /// Start preparing the loaded source.
    ///
    /// `start_position`, when present, is applied before playback begins.
    /// `auto_play` decides whether the engine starts rendering once ready.
    async fn prepare(&self, start_position: Option<Duration>, auto_play: bool) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn stop(&self) -> Result<()>;

    async fn seek(&self, position: Duration) -> Result<()>;

    /// Set the engine-local gain (0.0 = muted, 1.0 = unity gain).
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Current playback position.
    async fn position(&self) -> Duration;

    /// Buffered share of the source, 0..=100.
    async fn buffered_percent(&self) -> u8;

    /// Total source duration, when known.
    async fn duration(&self) -> Option<Duration>;

    /// Whether the engine is rendering, or will as soon as it is ready.
    async fn play_when_ready(&self) -> bool;

    /// Tear the engine down. Further calls on this handle are undefined.
    async fn destroy(&self) -> Result<()>;
}

/// Allocates engine instances for the playback core.
pub trait EngineFactory: Send + Sync {
    /// Create a fresh engine bound to `listener`.
    fn create(&self, listener: Arc<dyn EngineListener>) -> Result<Box<dyn MediaEngine>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_codes_match_host_surface() {
        assert_eq!(PlaybackState::Initial.code(), -1);
        assert_eq!(PlaybackState::Stopped.code(), 0);
        assert_eq!(PlaybackState::Playing.code(), 1);
        assert_eq!(PlaybackState::Paused.code(), 2);
        assert_eq!(PlaybackState::Completed.code(), 3);
        assert_eq!(PlaybackState::Error("boom".into()).code(), 4);
    }

    #[test]
    fn active_states_are_playing_and_paused() {
        assert!(PlaybackState::Playing.is_active());
        assert!(PlaybackState::Paused.is_active());
        assert!(!PlaybackState::Stopped.is_active());
        assert!(!PlaybackState::Completed.is_active());
        assert!(PlaybackState::Initial.is_idle());
        assert!(PlaybackState::Error("x".into()).is_idle());
    }

    #[test]
    fn state_serializes_with_message() {
        let json = serde_json::to_string(&PlaybackState::Error("network timeout".into())).unwrap();
        assert_eq!(json, r#"{"state":"error","message":"network timeout"}"#);

        let json = serde_json::to_string(&PlaybackState::Paused).unwrap();
        assert_eq!(json, r#"{"state":"paused"}"#);
    }

    #[test]
    fn media_source_exposes_url() {
        let source = MediaSource::Network {
            url: "https://example.com/a.mp3".into(),
            headers: HashMap::new(),
            user_agent: "AudioService/1.0".into(),
        };
        assert!(source.is_remote());
        assert_eq!(source.url(), "https://example.com/a.mp3");

        let local = MediaSource::Generic {
            url: "/music/a.mp3".into(),
        };
        assert!(!local.is_remote());
    }
}
