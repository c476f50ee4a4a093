//! # Player Handle
//!
//! The control facade. [`PlayerHandle::spawn`] starts the playback service
//! and an event relay; the handle turns method calls into [`Command`]s,
//! awaits each reply, and exposes the broadcast [`EventBus`] plus a mirror of
//! the latest [`PlaybackState`].
//!
//! ```rust,ignore
//! let player = PlayerHandle::spawn(&core_config);
//! let mut events = player.subscribe();
//!
//! player.create(PlayerConfig::default()).await?;
//! player.play(PlayRequest::url("https://cdn.example.com/a.mp3")).await?;
//! ```
//!
//! Cloned handles address the same service. The service shuts down (and
//! tears its session down) once the last handle is dropped.

use bridge_traits::PlaybackState;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, EventStream};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, trace};

use crate::command::{Command, CommandOutcome, PlayRequest, ThemeColors};
use crate::config::{OptionsUpdate, PlayerConfig};
use crate::controller::{EventOutbox, SessionBridges, SessionSnapshot};
use crate::error::{PlaybackError, Result};
use crate::service::{PlaybackService, Request};

/// Cloneable facade over the playback service.
#[derive(Clone)]
pub struct PlayerHandle {
    requests: mpsc::Sender<Request>,
    event_bus: EventBus,
    state: watch::Receiver<PlaybackState>,
}

impl PlayerHandle {
    /// Spawn the service and relay tasks on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like `tokio::spawn`.
    pub fn spawn(config: &CoreConfig) -> Self {
        let channel = &config.channel;
        let (request_tx, request_rx) = mpsc::channel(channel.command_capacity);
        let (event_tx, event_rx) = mpsc::channel(channel.event_capacity);
        let (state_tx, state_rx) = watch::channel(PlaybackState::Initial);
        let event_bus = EventBus::new(channel.broadcast_capacity);

        let bridges = SessionBridges {
            engine_factory: Arc::clone(&config.engine_factory),
            audio_system: Arc::clone(&config.audio_system),
            status_surface: Arc::clone(&config.status_surface),
        };
        let outbox = Arc::new(EventOutbox::new(event_tx, state_tx));
        let service = PlaybackService::new(channel.name.clone(), bridges, request_rx, outbox);

        tokio::spawn(service.run());
        tokio::spawn(relay_events(event_rx, event_bus.clone()));
        debug!(channel = %channel.name, "Player handle spawned");

        Self {
            requests: request_tx,
            event_bus,
            state: state_rx,
        }
    }

    /// Send any command and wait for the service's answer.
    pub async fn send(&self, command: Command) -> Result<CommandOutcome> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Command { command, reply })
            .await
            .map_err(|_| PlaybackError::ChannelClosed)?;
        response.await.map_err(|_| PlaybackError::ChannelClosed)?
    }

    pub async fn create(&self, config: PlayerConfig) -> Result<CommandOutcome> {
        self.send(Command::Create(config)).await
    }

    pub async fn destroy(&self) -> Result<CommandOutcome> {
        self.send(Command::Destroy).await
    }

    pub async fn play(&self, request: PlayRequest) -> Result<CommandOutcome> {
        self.send(Command::Play(request)).await
    }

    pub async fn pause(&self) -> Result<CommandOutcome> {
        self.send(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<CommandOutcome> {
        self.send(Command::Resume).await
    }

    pub async fn stop(&self) -> Result<CommandOutcome> {
        self.send(Command::Stop).await
    }

    pub async fn toggle(&self) -> Result<CommandOutcome> {
        self.send(Command::Toggle).await
    }

    pub async fn seek(&self, position: Duration) -> Result<CommandOutcome> {
        self.send(Command::Seek(position)).await
    }

    pub async fn set_volume(&self, volume: f32) -> Result<CommandOutcome> {
        self.send(Command::SetVolume(volume)).await
    }

    pub async fn change_track(
        &self,
        url: impl Into<String>,
        headers: Option<String>,
        start_position: Option<Duration>,
    ) -> Result<CommandOutcome> {
        self.send(Command::ChangeTrack {
            url: url.into(),
            headers,
            start_position,
        })
        .await
    }

    pub async fn update_status_surface(
        &self,
        title: Option<String>,
        subtitle: Option<String>,
    ) -> Result<CommandOutcome> {
        self.send(Command::UpdateStatusSurface { title, subtitle })
            .await
    }

    pub async fn update_status_theme(&self, colors: ThemeColors) -> Result<CommandOutcome> {
        self.send(Command::UpdateStatusTheme(colors)).await
    }

    pub async fn update_options(&self, update: OptionsUpdate) -> Result<CommandOutcome> {
        self.send(Command::UpdateOptions(update)).await
    }

    /// Current session view, or `None` when no session exists.
    pub async fn snapshot(&self) -> Result<Option<SessionSnapshot>> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Snapshot { reply })
            .await
            .map_err(|_| PlaybackError::ChannelClosed)?;
        response.await.map_err(|_| PlaybackError::ChannelClosed)
    }

    /// Latest state emitted by the service; `Initial` outside a session.
    pub fn state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    /// Watch the state mirror for changes.
    pub fn watch_state(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    /// Subscribe to every event published from now on.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("state", &*self.state.borrow())
            .field("subscribers", &self.event_bus.subscriber_count())
            .finish()
    }
}

async fn relay_events(mut events: mpsc::Receiver<CoreEvent>, bus: EventBus) {
    while let Some(event) = events.recv().await {
        let description = event.description();
        if bus.emit(event).is_err() {
            trace!(event = description, "No event subscribers");
        }
    }
    trace!("Event relay stopped");
}
