//! Shared fakes for playback scenario tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_desktop::{FocusClient, FocusRegistry};
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    EngineEvent, EngineFactory, EngineListener, MediaEngine, MediaSource, PlaybackState,
    StatusFrame, StatusSurface, StatusTheme, SurfaceControl, SurfaceControlHandler,
};
use core_playback::{PlayerConfig, PlayerHandle};
use core_runtime::config::{ChannelConfig, CoreConfig};
use core_runtime::events::{CoreEvent, EventStream, PlaybackEvent};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(MediaSource),
    Prepare {
        start_position: Option<Duration>,
        auto_play: bool,
    },
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetVolume(f32),
    Destroy,
}

/// Observable state of one fake engine instance.
pub struct FakeEngine {
    listener: Arc<dyn EngineListener>,
    calls: Mutex<Vec<EngineCall>>,
    position: Mutex<Duration>,
    duration: Mutex<Option<Duration>>,
    buffered: AtomicU8,
    play_when_ready: AtomicBool,
    destroyed: AtomicBool,
}

impl FakeEngine {
    /// Fire an engine callback as the host engine would.
    pub fn emit(&self, event: EngineEvent) {
        self.listener.on_event(event);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub fn set_position(&self, position: Duration) {
        *self.position.lock() = position;
    }

    pub fn set_buffered(&self, percent: u8) {
        self.buffered.store(percent, Ordering::SeqCst);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn loaded_source(&self) -> Option<MediaSource> {
        self.calls().into_iter().find_map(|call| match call {
            EngineCall::Load(source) => Some(source),
            _ => None,
        })
    }

    pub fn prepared_at(&self) -> Option<Option<Duration>> {
        self.calls().into_iter().find_map(|call| match call {
            EngineCall::Prepare { start_position, .. } => Some(start_position),
            _ => None,
        })
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().push(call);
    }
}

struct FakeEngineHandle(Arc<FakeEngine>);

#[async_trait]
impl MediaEngine for FakeEngineHandle {
    async fn load_source(&self, source: MediaSource) -> BridgeResult<()> {
        self.0.record(EngineCall::Load(source));
        Ok(())
    }

    async fn prepare(&self, start_position: Option<Duration>, auto_play: bool) -> BridgeResult<()> {
        self.0.record(EngineCall::Prepare {
            start_position,
            auto_play,
        });
        *self.0.position.lock() = start_position.unwrap_or_default();
        self.0.play_when_ready.store(auto_play, Ordering::SeqCst);
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.0.record(EngineCall::Play);
        self.0.play_when_ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.0.record(EngineCall::Pause);
        self.0.play_when_ready.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> BridgeResult<()> {
        self.0.record(EngineCall::Stop);
        Ok(())
    }

    async fn seek(&self, position: Duration) -> BridgeResult<()> {
        self.0.record(EngineCall::Seek(position));
        *self.0.position.lock() = position;
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.0.record(EngineCall::SetVolume(volume));
        Ok(())
    }

    async fn position(&self) -> Duration {
        *self.0.position.lock()
    }

    async fn buffered_percent(&self) -> u8 {
        self.0.buffered.load(Ordering::SeqCst)
    }

    async fn duration(&self) -> Option<Duration> {
        *self.0.duration.lock()
    }

    async fn play_when_ready(&self) -> bool {
        self.0.play_when_ready.load(Ordering::SeqCst)
    }

    async fn destroy(&self) -> BridgeResult<()> {
        self.0.record(EngineCall::Destroy);
        self.0.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Records every engine it creates.
#[derive(Default)]
pub struct FakeEngineFactory {
    engines: Mutex<Vec<Arc<FakeEngine>>>,
    fail_next: Mutex<Option<String>>,
}

impl FakeEngineFactory {
    pub fn created(&self) -> usize {
        self.engines.lock().len()
    }

    pub fn engine(&self, index: usize) -> Arc<FakeEngine> {
        Arc::clone(&self.engines.lock()[index])
    }

    pub fn last(&self) -> Arc<FakeEngine> {
        let engines = self.engines.lock();
        Arc::clone(engines.last().expect("no engine created yet"))
    }

    /// Engines created and not yet destroyed.
    pub fn live(&self) -> usize {
        self.engines
            .lock()
            .iter()
            .filter(|engine| !engine.is_destroyed())
            .count()
    }

    pub fn fail_next_create(&self, message: &str) {
        *self.fail_next.lock() = Some(message.to_string());
    }
}

impl EngineFactory for FakeEngineFactory {
    fn create(&self, listener: Arc<dyn EngineListener>) -> BridgeResult<Box<dyn MediaEngine>> {
        if let Some(message) = self.fail_next.lock().take() {
            return Err(BridgeError::Engine(message));
        }

        let engine = Arc::new(FakeEngine {
            listener,
            calls: Mutex::new(Vec::new()),
            position: Mutex::new(Duration::ZERO),
            duration: Mutex::new(Some(Duration::from_secs(180))),
            buffered: AtomicU8::new(0),
            play_when_ready: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        });
        self.engines.lock().push(Arc::clone(&engine));
        Ok(Box::new(FakeEngineHandle(engine)))
    }
}

/// Status surface that keeps everything it was asked to show.
#[derive(Default)]
pub struct RecordingSurface {
    frames: Mutex<Vec<StatusFrame>>,
    themes: Mutex<Vec<StatusTheme>>,
    controls: Mutex<Option<Arc<dyn SurfaceControlHandler>>>,
}

impl RecordingSurface {
    pub fn frames(&self) -> Vec<StatusFrame> {
        self.frames.lock().clone()
    }

    pub fn last_frame(&self) -> Option<StatusFrame> {
        self.frames.lock().last().cloned()
    }

    pub fn themes(&self) -> Vec<StatusTheme> {
        self.themes.lock().clone()
    }

    pub fn press(&self, control: SurfaceControl) {
        let handler = self.controls.lock().clone();
        if let Some(handler) = handler {
            handler.on_control(control);
        }
    }
}

#[async_trait]
impl StatusSurface for RecordingSurface {
    async fn render(&self, frame: StatusFrame) -> BridgeResult<()> {
        self.frames.lock().push(frame);
        Ok(())
    }

    async fn apply_theme(&self, theme: StatusTheme) -> BridgeResult<()> {
        self.themes.lock().push(theme);
        Ok(())
    }

    fn attach_controls(&self, handler: Arc<dyn SurfaceControlHandler>) {
        *self.controls.lock() = Some(handler);
    }
}

/// A spawned player wired to fakes and a private focus registry.
pub struct Harness {
    pub player: PlayerHandle,
    pub engines: Arc<FakeEngineFactory>,
    pub surface: Arc<RecordingSurface>,
    pub registry: FocusRegistry,
    pub audio: FocusClient,
}

impl Harness {
    pub fn new() -> Self {
        let engines = Arc::new(FakeEngineFactory::default());
        let surface = Arc::new(RecordingSurface::default());
        let registry = FocusRegistry::new();
        let audio = registry.client();

        let config = CoreConfig::builder()
            .engine_factory(engines.clone())
            .audio_system(Arc::new(audio.clone()))
            .status_surface(surface.clone())
            .channel(ChannelConfig::named("test-player"))
            .build()
            .expect("valid core config");

        Self {
            player: PlayerHandle::spawn(&config),
            engines,
            surface,
            registry,
            audio,
        }
    }

    /// Spawn and create a session with `config`.
    pub async fn created(config: PlayerConfig) -> Self {
        let harness = Self::new();
        harness.player.create(config).await.expect("create");
        harness
    }

    pub async fn state(&self) -> PlaybackState {
        self.player
            .snapshot()
            .await
            .expect("service running")
            .map(|snapshot| snapshot.state)
            .unwrap_or_default()
    }
}

/// Next status change on `events`, skipping everything else.
pub async fn next_status(events: &mut EventStream) -> PlaybackState {
    loop {
        match events.recv().await.expect("event stream open") {
            CoreEvent::Playback(PlaybackEvent::StatusChanged { state }) => return state,
            _ => continue,
        }
    }
}

/// Drain every event currently buffered on `events`.
pub fn drain(events: &mut EventStream) -> Vec<CoreEvent> {
    let mut out = Vec::new();
    while let Some(Ok(event)) = events.try_recv() {
        out.push(event);
    }
    out
}

/// Collect events up to and including the session's `Destroyed` event.
pub async fn collect_until_destroyed(events: &mut EventStream) -> Vec<CoreEvent> {
    let mut out = Vec::new();
    loop {
        let event = events.recv().await.expect("event stream open");
        let done = matches!(
            event,
            CoreEvent::Session(core_runtime::events::SessionEvent::Destroyed { .. })
        );
        out.push(event);
        if done {
            return out;
        }
    }
}

pub fn statuses(events: &[CoreEvent]) -> Vec<PlaybackState> {
    events
        .iter()
        .filter_map(|event| match event {
            CoreEvent::Playback(PlaybackEvent::StatusChanged { state }) => Some(state.clone()),
            _ => None,
        })
        .collect()
}

/// Focus listener for a competing producer that ignores what it hears.
pub struct SilentListener;

impl bridge_traits::FocusChangeListener for SilentListener {
    fn on_focus_change(&self, _change: bridge_traits::FocusChange) {}
}
