//! # Event Bus
//!
//! The playback service queues its events on one ordered channel; the
//! `core_playback::PlayerHandle` relay copies
//! them onto an [`EventBus`] so any number of observers can follow along.
//!
//! ```text
//! service ──(ordered mpsc)──> relay ──emit──> EventBus ──subscribe──> observers
//! ```
//!
//! A subscriber that stalls for longer than the bus capacity gets
//! `RecvError::Lagged(n)` and keeps going from the oldest retained event.
//! Position samples arrive every few hundred milliseconds, so this happens
//! quickly to observers that stop polling. `RecvError::Closed` means the
//! player is gone.
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut observer = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::PositionUpdate { position_ms: 1_200 }))
//!     .ok();
//!
//! let event = observer.recv().await.unwrap();
//! assert_eq!(event.description(), "Playback position updated");
//! # }
//! ```

use bridge_traits::playback::PlaybackState;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Broadcast capacity used when the host does not pick one.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Everything an observer can receive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Session(SessionEvent),
    Playback(PlaybackEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &'static str {
        match self {
            CoreEvent::Session(SessionEvent::Created { .. }) => "Playback session created",
            CoreEvent::Session(SessionEvent::Destroyed { .. }) => "Playback session destroyed",
            CoreEvent::Playback(PlaybackEvent::StatusChanged { .. }) => "Playback status changed",
            CoreEvent::Playback(PlaybackEvent::DurationAvailable { .. }) => {
                "Track duration available"
            }
            CoreEvent::Playback(PlaybackEvent::PositionUpdate { .. }) => {
                "Playback position updated"
            }
            CoreEvent::Playback(PlaybackEvent::BufferUpdate { .. }) => "Buffer level changed",
        }
    }

    /// Whether this event reports a transition into the error state.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CoreEvent::Playback(PlaybackEvent::StatusChanged {
                state: PlaybackState::Error(_)
            })
        )
    }
}

/// One `Created`/`Destroyed` pair per controller session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    Created { session_id: String },
    Destroyed { session_id: String },
}

/// Events produced by the playback state machine, in emission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// The playback state changed. Failures carry their message in
    /// [`PlaybackState::Error`].
    StatusChanged { state: PlaybackState },
    /// Source duration, at most once per load.
    DurationAvailable { duration_ms: u64 },
    /// Periodic position sample while playing.
    PositionUpdate { position_ms: u64 },
    /// Buffered share changed since the previous sample.
    BufferUpdate { percent: u8 },
}

/// Cloneable publisher; every [`subscribe`](EventBus::subscribe) call gets its
/// own receiver that sees events emitted from then on.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// `capacity` is how far a subscriber may fall behind before it lags.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Number of subscribers reached. Fails when nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A subscription with an optional predicate.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream, PlaybackEvent};
///
/// let bus = EventBus::new(16);
/// let _statuses = EventStream::new(bus.subscribe()).filter(|event| {
///     matches!(event, CoreEvent::Playback(PlaybackEvent::StatusChanged { .. }))
/// });
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Keep only events matching `predicate`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next matching event.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` after missing `n` events, `RecvError::Closed`
    /// once the bus is dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`recv`](EventStream::recv); `None` when
    /// nothing matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            };
            if self.accepts(&event) {
                return Some(Ok(event));
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: PlaybackState) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::StatusChanged { state })
    }

    #[test]
    fn emit_without_observers_fails() {
        let bus = EventBus::default();
        assert!(bus.emit(status(PlaybackState::Playing)).is_err());
    }

    #[tokio::test]
    async fn every_observer_sees_every_event() {
        let bus = EventBus::new(10);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let event = status(PlaybackState::Paused);
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn events_arrive_in_emission_order() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());

        let sequence = vec![
            status(PlaybackState::Playing),
            CoreEvent::Playback(PlaybackEvent::DurationAvailable { duration_ms: 180_000 }),
            CoreEvent::Playback(PlaybackEvent::PositionUpdate { position_ms: 0 }),
            CoreEvent::Playback(PlaybackEvent::BufferUpdate { percent: 12 }),
        ];
        for event in &sequence {
            bus.emit(event.clone()).ok();
        }

        for expected in sequence {
            assert_eq!(stream.recv().await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn filtered_stream_skips_progress() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe()).filter(|event| {
            matches!(event, CoreEvent::Playback(PlaybackEvent::StatusChanged { .. }))
        });

        bus.emit(CoreEvent::Playback(PlaybackEvent::PositionUpdate { position_ms: 200 }))
            .ok();
        let completed = status(PlaybackState::Completed);
        bus.emit(completed.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), completed);
    }

    #[tokio::test]
    async fn stalled_observer_lags() {
        let bus = EventBus::new(2);
        let mut observer = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Playback(PlaybackEvent::PositionUpdate {
                position_ms: i * 200,
            }))
            .ok();
        }

        assert!(matches!(observer.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn failures_are_flagged() {
        assert!(status(PlaybackState::Error("network timeout".into())).is_failure());
        assert!(!status(PlaybackState::Stopped).is_failure());
        assert_eq!(
            CoreEvent::Session(SessionEvent::Created {
                session_id: "s".into()
            })
            .description(),
            "Playback session created"
        );
    }

    #[test]
    fn status_events_serialize_with_message() {
        let event = status(PlaybackState::Error("network timeout".into()));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("network timeout"));
        assert!(json.contains("StatusChanged"));

        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn try_recv_skips_filtered_events() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Playback(PlaybackEvent::DurationAvailable { .. })));
        assert!(stream.try_recv().is_none());

        bus.emit(CoreEvent::Playback(PlaybackEvent::BufferUpdate { percent: 1 }))
            .ok();
        let event = CoreEvent::Playback(PlaybackEvent::DurationAvailable { duration_ms: 1 });
        bus.emit(event.clone()).ok();

        assert_eq!(stream.try_recv().unwrap().unwrap(), event);
        assert!(stream.try_recv().is_none());
    }
}
