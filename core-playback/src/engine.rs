//! # Engine Slot
//!
//! Owns at most one media engine for the session and knows how to create,
//! address and release it. Source selection for a URL lives here too.

use bridge_traits::{BridgeError, EngineEvent, EngineFactory, EngineListener, MediaEngine, MediaSource};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{PlaybackError, Result};
use crate::session::SessionId;
use crate::signal::{Signal, SignalSender};

/// User agent sent with remote sources when the request headers carry none.
pub const DEFAULT_USER_AGENT: &str = concat!("AudioService/", env!("CARGO_PKG_VERSION"), " Mobile");

/// Generation number of one engine instance within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(u64);

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine-{}", self.0)
    }
}

/// Position and intent captured from an engine right before teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReleasedEngine {
    pub position: Duration,
    pub play_when_ready: bool,
}

struct EngineCallback {
    session: SessionId,
    engine: EngineId,
    signals: SignalSender,
}

impl EngineListener for EngineCallback {
    fn on_event(&self, event: EngineEvent) {
        let signal = Signal::Engine {
            session: self.session,
            engine: self.engine,
            event,
        };
        if self.signals.send(signal).is_err() {
            trace!(engine = %self.engine, "Engine event after service shutdown");
        }
    }
}

pub(crate) struct EngineSlot {
    factory: Arc<dyn EngineFactory>,
    session: SessionId,
    signals: SignalSender,
    active: Option<(EngineId, Box<dyn MediaEngine>)>,
    next_id: u64,
}

impl EngineSlot {
    pub fn new(factory: Arc<dyn EngineFactory>, session: SessionId, signals: SignalSender) -> Self {
        Self {
            factory,
            session,
            signals,
            active: None,
            next_id: 0,
        }
    }

    pub fn is_held(&self) -> bool {
        self.active.is_some()
    }

    pub fn id(&self) -> Option<EngineId> {
        self.active.as_ref().map(|(id, _)| *id)
    }

    pub fn get(&self) -> Option<&dyn MediaEngine> {
        self.active.as_ref().map(|(_, engine)| engine.as_ref())
    }

    /// Create an engine unless one is already held.
    pub fn ensure(&mut self) -> Result<&dyn MediaEngine> {
        if self.active.is_none() {
            self.next_id += 1;
            let id = EngineId(self.next_id);
            let listener = Arc::new(EngineCallback {
                session: self.session,
                engine: id,
                signals: self.signals.clone(),
            });
            let engine = self
                .factory
                .create(listener)
                .map_err(engine_error)?;
            debug!(engine = %id, "Engine created");
            self.active = Some((id, engine));
        }

        self.get()
            .ok_or_else(|| PlaybackError::Internal("engine slot empty after create".to_string()))
    }

    /// Tear the held engine down. Returns `None` when nothing was held.
    ///
    /// Teardown failures are logged; the slot is empty afterwards either way.
    pub async fn release(&mut self) -> Option<ReleasedEngine> {
        let (id, engine) = self.active.take()?;

        let released = ReleasedEngine {
            position: engine.position().await,
            play_when_ready: engine.play_when_ready().await,
        };

        if let Err(e) = engine.pause().await {
            warn!(engine = %id, error = %e, "Engine pause failed during release");
        }
        if let Err(e) = engine.stop().await {
            warn!(engine = %id, error = %e, "Engine stop failed during release");
        }
        if let Err(e) = engine.destroy().await {
            warn!(engine = %id, error = %e, "Engine destroy failed during release");
        }

        debug!(
            engine = %id,
            position_ms = released.position.as_millis() as u64,
            "Engine released"
        );
        Some(released)
    }
}

/// Host engine failures keep their own message.
pub(crate) fn engine_error(error: BridgeError) -> PlaybackError {
    match error {
        BridgeError::Engine(message) => PlaybackError::Engine(message),
        other => PlaybackError::Engine(other.to_string()),
    }
}

/// Pick the loader for `url`.
///
/// `http`/`https` URLs get a network source carrying the request headers and
/// a user agent (the headers' own `User-Agent` when present). Anything else,
/// including strings that do not parse as URLs, is a generic source.
pub fn select_source(url: &str, headers: &HashMap<String, String>) -> MediaSource {
    let remote = Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false);

    if !remote {
        return MediaSource::Generic {
            url: url.to_string(),
        };
    }

    let user_agent = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("user-agent"))
        .map(|(_, value)| value.clone())
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    MediaSource::Network {
        url: url.to_string(),
        headers: headers.clone(),
        user_agent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_sources_use_network_loader() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer x".to_string());

        let source = select_source("https://cdn.example.com/a.mp3", &headers);
        match source {
            MediaSource::Network {
                headers,
                user_agent,
                ..
            } => {
                assert_eq!(user_agent, DEFAULT_USER_AGENT);
                assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer x"));
            }
            other => panic!("expected network source, got {:?}", other),
        }
    }

    #[test]
    fn user_agent_header_overrides_default() {
        let mut headers = HashMap::new();
        headers.insert("user-agent".to_string(), "Foo/1".to_string());

        let source = select_source("http://example.com/live", &headers);
        assert!(matches!(
            source,
            MediaSource::Network { ref user_agent, .. } if user_agent == "Foo/1"
        ));
    }

    #[test]
    fn non_http_sources_are_generic() {
        let headers = HashMap::new();
        assert!(!select_source("file:///music/a.mp3", &headers).is_remote());
        assert!(!select_source("content://media/external/audio/1", &headers).is_remote());
        assert!(!select_source("/storage/music/a.mp3", &headers).is_remote());
        assert!(!select_source("a.mp3", &headers).is_remote());
    }

    #[test]
    fn default_user_agent_names_service() {
        assert!(DEFAULT_USER_AGENT.starts_with("AudioService/"));
    }
}
