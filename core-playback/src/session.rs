//! Mutable state of one controller session (`Create` to `Destroy`).

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::error::PlaybackError;

/// Unique identifier for one controller session.
///
/// Every internal signal carries the id of the session that produced it so a
/// late callback from a destroyed session is recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Track-related state owned by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub current_url: Option<String>,
    pub request_headers: HashMap<String, String>,
    /// Position recorded when the last engine was released.
    pub last_known_position: Option<Duration>,
    /// Whether the next engine starts rendering once ready.
    pub pending_auto_play: bool,
    /// Seek requested while no engine was held.
    pub pending_seek: Option<Duration>,
    /// Set only when playback was paused by a focus loss.
    pub auto_resume_on_focus_regain: bool,
    pub buffered_percent: u8,
    pub duration_reported: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            current_url: None,
            request_headers: HashMap::new(),
            last_known_position: None,
            pending_auto_play: true,
            pending_seek: None,
            auto_resume_on_focus_regain: false,
            buffered_percent: 0,
            duration_reported: false,
        }
    }
}

impl Session {
    /// Adopt a new source when `url` is non-empty; headers are parsed with it.
    ///
    /// Returns whether a URL is known afterwards.
    pub fn adopt(&mut self, url: Option<&str>, headers: Option<&str>) -> bool {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.current_url = Some(url.to_string());
            self.request_headers = parse_headers(headers);
        }
        self.current_url.is_some()
    }

    /// Reset per-load flags before a fresh `Play`/`ChangeTrack`.
    pub fn begin_load(&mut self) {
        self.duration_reported = false;
        self.auto_resume_on_focus_regain = false;
        self.pending_auto_play = true;
    }

    /// Position to apply to the next engine, consumed exactly once.
    ///
    /// An explicit seek wins over the position recorded at release.
    pub fn take_start_position(&mut self) -> Option<Duration> {
        let pending = self.pending_seek.take();
        let recorded = self.last_known_position.take();
        pending.or(recorded)
    }

    /// Forget every stored position.
    pub fn clear_positions(&mut self) {
        self.pending_seek = None;
        self.last_known_position = None;
    }
}

/// Parse a JSON object of request headers.
///
/// Never fails: entries with empty or non-string values are skipped, and
/// malformed input yields an empty map.
pub fn parse_headers(raw: Option<&str>) -> HashMap<String, String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return HashMap::new();
    };

    match try_parse_headers(raw) {
        Ok(headers) => headers,
        Err(err) => {
            warn!(error = %err, "Ignoring request headers");
            HashMap::new()
        }
    }
}

fn try_parse_headers(raw: &str) -> Result<HashMap<String, String>, PlaybackError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| PlaybackError::InvalidHeaders(e.to_string()))?;

    let Value::Object(entries) = value else {
        return Err(PlaybackError::InvalidHeaders(
            "expected a JSON object".to_string(),
        ));
    };

    Ok(entries
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::String(v) if !v.is_empty() => Some((name, v)),
            _ => None,
        })
        .collect())
}
