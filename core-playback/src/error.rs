//! # Playback Error Types
//!
//! Error types for the playback controller.
//!
//! Only some of these ever reach a caller. Configuration problems (bad header
//! JSON, unparsable colors) are recovered where they occur and logged; engine
//! failures become [`PlaybackState::Error`](bridge_traits::PlaybackState::Error)
//! transitions; commands that arrive outside a session are ignored.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Request headers were not a JSON object of strings.
    #[error("Invalid request headers: {0}")]
    InvalidHeaders(String),

    /// A theme color could not be parsed.
    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    /// Player options are out of range.
    #[error("Invalid player configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The media engine failed to create, load or prepare a source.
    #[error("Engine error: {0}")]
    Engine(String),

    // ========================================================================
    // Focus Errors
    // ========================================================================
    /// The host audio system declined the focus request.
    #[error("Audio focus request denied")]
    FocusDenied,

    // ========================================================================
    // Channel Errors
    // ========================================================================
    /// The playback service task is gone; no further commands can be delivered.
    #[error("Playback service is not running")]
    ChannelClosed,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// A host bridge call failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` for malformed caller input that is recovered locally.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::InvalidHeaders(_)
                | PlaybackError::InvalidColor(_)
                | PlaybackError::InvalidConfig(_)
        )
    }

    /// Returns `true` if retrying the command (or sending a new `Play`) can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlaybackError::Engine(_) | PlaybackError::FocusDenied | PlaybackError::Bridge(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
