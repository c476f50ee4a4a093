//! # Playback State Machine
//!
//! [`PlaybackController`] owns one session: its state, the engine slot, the
//! focus registration, the progress reporter and the status presenter. It is
//! driven exclusively by the service task, one command or signal at a time,
//! so none of its fields need locking.
//!
//! ## Engine lifetime
//!
//! An engine exists only while [`PlaybackState::Playing`]. Pausing records
//! the position and releases the engine; resuming creates a fresh engine and
//! prepares it at the recorded position. Every other state holds nothing.

use bridge_traits::{
    AudioSystem, EngineEvent, EngineFactory, FocusChange, FocusGrant, PlaybackState,
    StatusSurface, SurfaceControl,
};
use core_runtime::events::{CoreEvent, PlaybackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::command::{Command, PlayRequest};
use crate::config::{OptionsUpdate, PlayerConfig};
use crate::engine::{engine_error, select_source, EngineId, EngineSlot};
use crate::error::{PlaybackError, Result};
use crate::focus::{FocusAction, FocusArbiter};
use crate::progress::ProgressReporter;
use crate::session::{Session, SessionId};
use crate::signal::{Signal, SignalSender};
use crate::status::StatusPresenter;
use core_runtime::logging::display_source;

/// Lifecycle logs go to `info` when the session enabled logging, else `debug`.
macro_rules! lifecycle {
    ($controller:expr, $($arg:tt)+) => {
        if $controller.config.logging_enabled {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

/// Host capabilities a session is built from.
#[derive(Clone)]
pub(crate) struct SessionBridges {
    pub engine_factory: Arc<dyn EngineFactory>,
    pub audio_system: Arc<dyn AudioSystem>,
    pub status_surface: Arc<dyn StatusSurface>,
}

/// Ordered outbound event path plus the facade's state mirror.
pub(crate) struct EventOutbox {
    events: mpsc::Sender<CoreEvent>,
    state: watch::Sender<PlaybackState>,
}

impl EventOutbox {
    pub fn new(events: mpsc::Sender<CoreEvent>, state: watch::Sender<PlaybackState>) -> Self {
        Self { events, state }
    }

    pub async fn emit(&self, event: CoreEvent) {
        if let CoreEvent::Playback(PlaybackEvent::StatusChanged { state }) = &event {
            self.state.send_replace(state.clone());
        }
        if self.events.send(event).await.is_err() {
            trace!("Event relay closed; dropping event");
        }
    }

    pub fn reset_state(&self) {
        self.state.send_replace(PlaybackState::Initial);
    }
}

/// Point-in-time view of a session, for hosts and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub state: PlaybackState,
    pub current_url: Option<String>,
    pub last_known_position: Option<Duration>,
    pub pending_seek: Option<Duration>,
    pub auto_resume_on_focus_regain: bool,
    pub engine_held: bool,
    pub focus_held: bool,
    pub progress_running: bool,
    pub config: PlayerConfig,
}

pub(crate) struct PlaybackController {
    id: SessionId,
    config: PlayerConfig,
    state: PlaybackState,
    session: Session,
    engine: EngineSlot,
    focus: FocusArbiter,
    progress: ProgressReporter,
    status: StatusPresenter,
    audio: Arc<dyn AudioSystem>,
    outbox: Arc<EventOutbox>,
}

impl PlaybackController {
    pub fn new(
        config: PlayerConfig,
        bridges: &SessionBridges,
        signals: SignalSender,
        outbox: Arc<EventOutbox>,
    ) -> Self {
        let id = SessionId::new();
        let status = StatusPresenter::new(Arc::clone(&bridges.status_surface));
        status.attach_controls(id, signals.clone());

        Self {
            id,
            state: PlaybackState::Initial,
            session: Session::default(),
            engine: EngineSlot::new(Arc::clone(&bridges.engine_factory), id, signals.clone()),
            focus: FocusArbiter::new(
                Arc::clone(&bridges.audio_system),
                id,
                signals.clone(),
                config.request_audio_focus,
            ),
            progress: ProgressReporter::new(id, signals),
            status,
            audio: Arc::clone(&bridges.audio_system),
            outbox,
            config,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            state: self.state.clone(),
            current_url: self.session.current_url.clone(),
            last_known_position: self.session.last_known_position,
            pending_seek: self.session.pending_seek,
            auto_resume_on_focus_regain: self.session.auto_resume_on_focus_regain,
            engine_held: self.engine.is_held(),
            focus_held: self.focus.is_held(),
            progress_running: self.progress.is_running(),
            config: self.config.clone(),
        }
    }

    /// Apply a session-scoped command. `Create`/`Destroy` belong to the
    /// service and are ignored here.
    pub async fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Create(_) | Command::Destroy => Ok(()),
            Command::Play(request) => self.play(request).await,
            Command::Pause => self.pause().await,
            Command::Resume => self.resume().await,
            Command::Stop => self.stop().await,
            Command::Toggle => self.toggle().await,
            Command::Seek(position) => {
                self.seek(position).await;
                Ok(())
            }
            Command::SetVolume(volume) => {
                self.set_volume(volume).await;
                Ok(())
            }
            Command::ChangeTrack {
                url,
                headers,
                start_position,
            } => self.change_track(url, headers, start_position).await,
            Command::UpdateStatusSurface { title, subtitle } => {
                lifecycle!(self, ?title, ?subtitle, "Updating status surface");
                self.status.update_text(title, subtitle).await;
                Ok(())
            }
            Command::UpdateStatusTheme(colors) => {
                lifecycle!(self, ?colors, "Updating status theme");
                self.status.apply_theme(&colors).await;
                Ok(())
            }
            Command::UpdateOptions(update) => self.update_options(update),
        }
    }

    /// Apply an internal signal already matched to this session.
    pub async fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Engine { engine, event, .. } => self.on_engine_event(engine, event).await,
            Signal::Focus {
                registration,
                change,
                ..
            } => self.on_focus_change(registration, change).await,
            Signal::ProgressTick { generation, .. } => self.on_progress_tick(generation).await,
            Signal::Control { control, .. } => self.on_control(control).await,
        }
    }

    /// Session teardown: reporter, then focus, then engine.
    pub async fn destroy(&mut self) {
        self.progress.stop();
        self.focus.abandon().await;
        self.release_engine().await;
        lifecycle!(self, session = %self.id, "Session destroyed");
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    async fn play(&mut self, request: PlayRequest) -> Result<()> {
        let PlayRequest {
            url,
            volume,
            start_position,
            headers,
        } = request;

        if let Some(volume) = volume {
            self.set_volume(volume).await;
        }

        if self.state.is_active() {
            let switching = url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .is_some_and(|u| self.session.current_url.as_deref() != Some(u));
            if switching {
                let url = url.unwrap_or_default();
                return self.change_track(url, headers, start_position).await;
            }

            if let Some(position) = start_position {
                self.seek(position).await;
            }
            return match self.state {
                PlaybackState::Playing => self.pause().await,
                _ => self.resume().await,
            };
        }

        if let Some(position) = start_position {
            self.seek(position).await;
        }
        self.start(url.as_deref(), headers.as_deref()).await
    }

    async fn pause(&mut self) -> Result<()> {
        self.session.auto_resume_on_focus_regain = false;
        if self.state != PlaybackState::Playing {
            trace!(state = %self.state, "Pause ignored");
            return Ok(());
        }

        self.release_engine().await;
        self.enter(PlaybackState::Paused).await;
        Ok(())
    }

    async fn resume(&mut self) -> Result<()> {
        self.session.auto_resume_on_focus_regain = false;
        if self.state != PlaybackState::Paused {
            trace!(state = %self.state, "Resume ignored");
            return Ok(());
        }

        self.acquire_focus().await?;
        self.session.pending_auto_play = true;
        self.load_and_play().await;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.session.auto_resume_on_focus_regain = false;
        if !self.state.is_active() {
            trace!(state = %self.state, "Stop ignored");
            return Ok(());
        }

        self.release_engine().await;
        self.session.clear_positions();
        self.enter(PlaybackState::Stopped).await;
        Ok(())
    }

    async fn toggle(&mut self) -> Result<()> {
        let result = match self.state {
            PlaybackState::Playing => self.pause().await,
            PlaybackState::Paused => self.resume().await,
            _ => self.start(None, None).await,
        };
        self.session.auto_resume_on_focus_regain = false;
        result
    }

    async fn seek(&mut self, position: Duration) {
        match self.engine.get() {
            Some(engine) => {
                if let Err(e) = engine.seek(position).await {
                    warn!(error = %e, "Engine seek failed");
                }
                self.session.clear_positions();
            }
            None => {
                trace!(position_ms = position.as_millis() as u64, "Seek stored until next load");
                self.session.pending_seek = Some(position);
            }
        }
    }

    async fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            warn!("Ignoring NaN volume");
            return;
        }

        let volume = volume.clamp(0.0, 1.0);
        if let Err(e) = self.audio.set_stream_volume(volume).await {
            warn!(volume, error = %e, "Failed to set stream volume");
        }
    }

    async fn change_track(
        &mut self,
        url: String,
        headers: Option<String>,
        start_position: Option<Duration>,
    ) -> Result<()> {
        self.release_engine().await;
        self.session.clear_positions();
        self.session.pending_seek = start_position;
        self.start(Some(&url), headers.as_deref()).await
    }

    fn update_options(&mut self, update: OptionsUpdate) -> Result<()> {
        self.config
            .apply(&update)
            .map_err(PlaybackError::InvalidConfig)?;
        self.focus.set_enabled(self.config.request_audio_focus);
        lifecycle!(self, ?update, "Options updated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    async fn on_engine_event(&mut self, engine: EngineId, event: EngineEvent) {
        if self.engine.id() != Some(engine) {
            trace!(%engine, ?event, "Dropping event from released engine");
            return;
        }

        match event {
            EngineEvent::Ready => self.report_duration().await,
            EngineEvent::Ended => {
                lifecycle!(self, %engine, "Playback completed");
                self.enter(PlaybackState::Completed).await;
                self.release_engine().await;
                self.session.clear_positions();
            }
            EngineEvent::Error(message) => {
                warn!(%engine, error = %message, "Engine reported an error");
                self.release_engine().await;
                self.session.clear_positions();
                self.enter(PlaybackState::Error(message)).await;
            }
        }
    }

    async fn on_focus_change(&mut self, registration: u64, change: FocusChange) {
        if !self.focus.accepts(registration) {
            trace!(registration, ?change, "Dropping focus change for stale registration");
            return;
        }

        lifecycle!(self, ?change, state = %self.state, "Audio focus changed");
        match FocusAction::from(change) {
            FocusAction::Loss { transient } if self.state == PlaybackState::Playing => {
                // pause() clears the flag; set it afterwards.
                if self.pause().await.is_ok() {
                    self.session.auto_resume_on_focus_regain =
                        self.config.focus_resume_policy.resumes_after(transient);
                }
            }
            FocusAction::Gain
                if self.state == PlaybackState::Paused
                    && self.session.auto_resume_on_focus_regain =>
            {
                self.session.auto_resume_on_focus_regain = false;
                self.session.pending_auto_play = true;
                self.load_and_play().await;
            }
            _ => {}
        }
    }

    async fn on_progress_tick(&mut self, generation: u64) {
        if !self.progress.accepts(generation) {
            return;
        }

        let Some(engine) = self.engine.get() else {
            self.progress.stop();
            return;
        };
        if !engine.play_when_ready().await {
            self.progress.stop();
            return;
        }

        let position = engine.position().await;
        let buffered = engine.buffered_percent().await.min(100);

        self.outbox
            .emit(CoreEvent::Playback(PlaybackEvent::PositionUpdate {
                position_ms: position.as_millis() as u64,
            }))
            .await;

        if buffered != self.session.buffered_percent {
            self.session.buffered_percent = buffered;
            self.outbox
                .emit(CoreEvent::Playback(PlaybackEvent::BufferUpdate {
                    percent: buffered,
                }))
                .await;
        }

        self.progress.schedule_next(self.config.progress_interval());
    }

    async fn on_control(&mut self, control: SurfaceControl) {
        lifecycle!(self, ?control, "Status surface control pressed");
        let result = match control {
            SurfaceControl::Stop => self.stop().await,
            SurfaceControl::Toggle => self.toggle().await,
        };
        if let Err(e) = result {
            warn!(?control, error = %e, "Status surface control failed");
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Fresh load of the adopted (or given) URL from an idle state.
    async fn start(&mut self, url: Option<&str>, headers: Option<&str>) -> Result<()> {
        let has_url = url.is_some_and(|u| !u.trim().is_empty());
        if !has_url && self.session.current_url.is_none() {
            debug!("Play ignored: no source adopted yet");
            return Ok(());
        }

        self.acquire_focus().await?;
        self.session.begin_load();
        self.session.adopt(url, headers);
        self.load_and_play().await;
        Ok(())
    }

    async fn acquire_focus(&mut self) -> Result<()> {
        match self.focus.request().await? {
            FocusGrant::Granted => Ok(()),
            FocusGrant::Denied => {
                warn!(state = %self.state, "Audio focus denied");
                Err(PlaybackError::FocusDenied)
            }
        }
    }

    /// Create and prepare an engine, then enter `Playing`; a failure lands
    /// in `Error`.
    async fn load_and_play(&mut self) {
        match self.load_engine().await {
            Ok(()) => self.enter(PlaybackState::Playing).await,
            Err(e) => {
                warn!(error = %e, "Failed to start engine");
                let message = match e {
                    PlaybackError::Engine(message) => message,
                    other => other.to_string(),
                };
                self.release_engine().await;
                self.session.clear_positions();
                self.enter(PlaybackState::Error(message)).await;
            }
        }
    }

    async fn load_engine(&mut self) -> Result<()> {
        let url = self
            .session
            .current_url
            .clone()
            .ok_or_else(|| PlaybackError::Internal("no source adopted".to_string()))?;

        let source = select_source(&url, &self.session.request_headers);
        let start_position = self.session.take_start_position();
        let auto_play = self.session.pending_auto_play;
        self.session.buffered_percent = 0;

        lifecycle!(
            self,
            source = %display_source(&url),
            remote = source.is_remote(),
            start_ms = start_position.map(|p| p.as_millis() as u64),
            auto_play,
            "Loading source"
        );

        let engine = self.engine.ensure()?;
        engine.load_source(source).await.map_err(engine_error)?;
        engine
            .prepare(start_position, auto_play)
            .await
            .map_err(engine_error)?;

        self.progress.start();
        Ok(())
    }

    async fn release_engine(&mut self) {
        self.progress.stop();
        if let Some(released) = self.engine.release().await {
            self.session.last_known_position = Some(released.position);
            self.session.pending_auto_play = released.play_when_ready;
        }
    }

    async fn report_duration(&mut self) {
        if self.session.duration_reported {
            return;
        }
        let Some(engine) = self.engine.get() else {
            return;
        };
        let Some(duration) = engine.duration().await else {
            trace!("Engine ready without a known duration");
            return;
        };

        self.session.duration_reported = true;
        self.outbox
            .emit(CoreEvent::Playback(PlaybackEvent::DurationAvailable {
                duration_ms: duration.as_millis() as u64,
            }))
            .await;
    }

    async fn enter(&mut self, state: PlaybackState) {
        lifecycle!(self, from = %self.state, to = %state, "Playback state changed");
        self.state = state.clone();
        self.status.render_state(&state).await;
        self.outbox
            .emit(CoreEvent::Playback(PlaybackEvent::StatusChanged { state }))
            .await;
    }
}
