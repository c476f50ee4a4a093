//! Internal signals funnelled into the playback service loop.
//!
//! Every external callback (engine, focus, surface buttons, progress timer)
//! is turned into a [`Signal`] and queued on one unbounded channel, so the
//! state machine only ever mutates from the service task. Each signal is
//! stamped with the session (and engine, registration or timer generation)
//! that produced it; the service drops anything stale.

use bridge_traits::{EngineEvent, FocusChange, SurfaceControl};
use tokio::sync::mpsc;

use crate::engine::EngineId;
use crate::session::SessionId;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Signal {
    Engine {
        session: SessionId,
        engine: EngineId,
        event: EngineEvent,
    },
    Focus {
        session: SessionId,
        registration: u64,
        change: FocusChange,
    },
    ProgressTick {
        session: SessionId,
        generation: u64,
    },
    Control {
        session: SessionId,
        control: SurfaceControl,
    },
}

impl Signal {
    pub(crate) fn session(&self) -> SessionId {
        match self {
            Signal::Engine { session, .. }
            | Signal::Focus { session, .. }
            | Signal::ProgressTick { session, .. }
            | Signal::Control { session, .. } => *session,
        }
    }
}

pub(crate) type SignalSender = mpsc::UnboundedSender<Signal>;
pub(crate) type SignalReceiver = mpsc::UnboundedReceiver<Signal>;
