//! Shared audio output abstractions.
//!
//! Audio focus is a process- or system-wide permission to produce audible
//! output. Several producers compete for it; the host arbitrates and tells
//! the current holder when it loses or regains focus.

use crate::error::Result;
use std::sync::Arc;

/// Focus changes reported by the host audio system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusChange {
    Gain,
    GainTransient,
    GainTransientMayDuck,
    Loss,
    LossTransient,
    LossTransientCanDuck,
}

impl FocusChange {
    /// Whether this change hands focus (back) to the listener.
    pub fn is_gain(&self) -> bool {
        matches!(
            self,
            FocusChange::Gain | FocusChange::GainTransient | FocusChange::GainTransientMayDuck
        )
    }

    /// Whether the host expects the loss to be temporary.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FocusChange::Gain | FocusChange::Loss)
    }
}

/// Immediate answer to a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusGrant {
    Granted,
    Denied,
}

/// Receives focus changes for one registration.
pub trait FocusChangeListener: Send + Sync {
    fn on_focus_change(&self, change: FocusChange);
}

/// Host audio system as seen by one audio producer.
///
/// Each producer gets its own `AudioSystem` handle; a handle holds at most one
/// focus registration at a time.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::audio::{AudioSystem, FocusGrant};
///
/// async fn start(audio: &dyn AudioSystem, listener: Arc<dyn FocusChangeListener>) {
///     if audio.request_focus(listener).await? == FocusGrant::Granted {
///         // begin rendering
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait AudioSystem: Send + Sync {
    /// Register `listener` and ask for focus.
    async fn request_focus(&self, listener: Arc<dyn FocusChangeListener>) -> Result<FocusGrant>;

    /// Drop this handle's registration. A no-op when nothing is registered.
    async fn abandon_focus(&self) -> Result<()>;

    /// Set the shared output volume, already clamped to `0.0..=1.0`.
    async fn set_stream_volume(&self, volume: f32) -> Result<()>;
}
