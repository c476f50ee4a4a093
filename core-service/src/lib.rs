//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media engine
//! factory, audio system, status surface) into the playback core and exposes
//! the named-method command surface hosts call over their message channel.
//! Desktop apps typically enable the `desktop-shims` feature (which depends
//! on `bridge-desktop`) so the audio system and status surface fall back to
//! in-process implementations.
//!
//! ```ignore
//! use core_service::{bootstrap, CoreService};
//! use serde_json::json;
//!
//! let config = CoreConfig::builder().engine_factory(factory).build()?;
//! let core = bootstrap(config, None)?;
//!
//! core.invoke("init", json!({"audioFocus": true})).await?;
//! core.invoke("play", json!({"url": "https://cdn.example.com/a.mp3"})).await?;
//! ```

pub mod error;
pub mod methods;

pub use error::{CoreError, Result};
pub use methods::Method;

use bridge_traits::PlaybackState;
use core_playback::{CommandOutcome, PlayerHandle};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventStream;
use core_runtime::logging::{init_logging, LoggingConfig};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Value returned by every successful command method.
pub const METHOD_OK: i64 = 1;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    player: PlayerHandle,
    channel: String,
}

impl CoreService {
    /// Spawn the playback service for `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        tokio::runtime::Handle::try_current().map_err(|e| {
            CoreError::InitializationFailed(format!("no tokio runtime available: {}", e))
        })?;

        let channel = config.channel.name.clone();
        let player = PlayerHandle::spawn(&config);
        debug!(channel = %channel, "Core service started");
        Ok(Self { player, channel })
    }

    /// Direct typed access to the player.
    pub fn player(&self) -> &PlayerHandle {
        &self.player
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Observe playback and session events.
    pub fn subscribe(&self) -> EventStream {
        self.player.subscribe()
    }

    pub fn state(&self) -> PlaybackState {
        self.player.state()
    }

    /// Call a method by name with JSON arguments.
    ///
    /// Commands answer [`METHOD_OK`]; `status` answers the numeric state code.
    #[instrument(skip(self, args), fields(channel = %self.channel))]
    pub async fn invoke(&self, method: &str, args: Value) -> Result<Value> {
        let Some(parsed) = Method::from_name(method) else {
            warn!(method, "Unknown method");
            return Err(CoreError::NotImplemented(method.to_string()));
        };

        if parsed == Method::Status {
            return Ok(Value::from(self.player.state().code()));
        }
        let Some(command) = parsed.to_command(args)? else {
            debug!(method, "Nothing to send");
            return Ok(Value::from(METHOD_OK));
        };

        match self.player.send(command).await? {
            CommandOutcome::Applied => {}
            CommandOutcome::Ignored => debug!(method, "Command ignored outside a session"),
        }
        Ok(Value::from(METHOD_OK))
    }
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService")
            .field("channel", &self.channel)
            .field("player", &self.player)
            .finish()
    }
}

/// Initialise logging (when `logging` is given) and start the service.
///
/// A logger sink on `config` is forwarded to the logging layer unless the
/// logging config already carries one. Logging that was already initialised
/// elsewhere in the process is left in place.
pub fn bootstrap(config: CoreConfig, logging: Option<LoggingConfig>) -> Result<CoreService> {
    if let Some(mut logging) = logging {
        if logging.logger_sink.is_none() {
            logging.logger_sink = config.logger_sink.clone();
        }
        if let Err(e) = init_logging(logging) {
            warn!(error = %e, "Logging already configured; keeping existing subscriber");
        }
    }

    CoreService::new(config)
}
