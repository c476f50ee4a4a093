//! Audio focus negotiation for one session.

use bridge_traits::{AudioSystem, FocusChange, FocusChangeListener, FocusGrant};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::session::SessionId;
use crate::signal::{Signal, SignalSender};

/// What a focus change asks the state machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusAction {
    Gain,
    Loss { transient: bool },
}

impl From<FocusChange> for FocusAction {
    fn from(change: FocusChange) -> Self {
        if change.is_gain() {
            FocusAction::Gain
        } else {
            FocusAction::Loss {
                transient: change.is_transient(),
            }
        }
    }
}

struct FocusCallback {
    session: SessionId,
    registration: u64,
    signals: SignalSender,
}

impl FocusChangeListener for FocusCallback {
    fn on_focus_change(&self, change: FocusChange) {
        let signal = Signal::Focus {
            session: self.session,
            registration: self.registration,
            change,
        };
        if self.signals.send(signal).is_err() {
            trace!(?change, "Focus change after service shutdown");
        }
    }
}

/// Holds at most one focus registration with the host audio system.
pub(crate) struct FocusArbiter {
    audio: Arc<dyn AudioSystem>,
    session: SessionId,
    signals: SignalSender,
    enabled: bool,
    registration: Option<u64>,
    next_registration: u64,
}

impl FocusArbiter {
    pub fn new(
        audio: Arc<dyn AudioSystem>,
        session: SessionId,
        signals: SignalSender,
        enabled: bool,
    ) -> Self {
        Self {
            audio,
            session,
            signals,
            enabled,
            registration: None,
            next_registration: 0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_held(&self) -> bool {
        self.registration.is_some()
    }

    /// Whether `registration` is the one currently held.
    pub fn accepts(&self, registration: u64) -> bool {
        self.registration == Some(registration)
    }

    /// Ask for focus. Granted immediately when negotiation is disabled.
    ///
    /// Any earlier registration is abandoned first.
    pub async fn request(&mut self) -> Result<FocusGrant> {
        if !self.enabled {
            return Ok(FocusGrant::Granted);
        }

        self.abandon().await;

        self.next_registration += 1;
        let registration = self.next_registration;
        let listener = Arc::new(FocusCallback {
            session: self.session,
            registration,
            signals: self.signals.clone(),
        });

        let grant = self.audio.request_focus(listener).await?;
        if grant == FocusGrant::Granted {
            self.registration = Some(registration);
        }
        debug!(registration, ?grant, "Audio focus requested");
        Ok(grant)
    }

    /// Drop the current registration, if any. Host failures are logged.
    pub async fn abandon(&mut self) {
        let Some(registration) = self.registration.take() else {
            return;
        };

        if let Err(e) = self.audio.abandon_focus().await {
            warn!(registration, error = %e, "Failed to abandon audio focus");
        } else {
            debug!(registration, "Audio focus abandoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::BridgeError;
    use mockall::mock;
    use tokio::sync::mpsc;

    mock! {
        Audio {}

        #[async_trait]
        impl AudioSystem for Audio {
            async fn request_focus(&self, listener: Arc<dyn FocusChangeListener>) -> BridgeResult<FocusGrant>;
            async fn abandon_focus(&self) -> BridgeResult<()>;
            async fn set_stream_volume(&self, volume: f32) -> BridgeResult<()>;
        }
    }

    fn arbiter(audio: MockAudio, enabled: bool) -> (FocusArbiter, mpsc::UnboundedReceiver<Signal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            FocusArbiter::new(Arc::new(audio), SessionId::new(), tx, enabled),
            rx,
        )
    }

    #[test]
    fn test_focus_actions() {
        assert_eq!(FocusAction::from(FocusChange::GainTransient), FocusAction::Gain);
        assert_eq!(
            FocusAction::from(FocusChange::Loss),
            FocusAction::Loss { transient: false }
        );
        assert_eq!(
            FocusAction::from(FocusChange::LossTransientCanDuck),
            FocusAction::Loss { transient: true }
        );
    }

    #[tokio::test]
    async fn test_disabled_focus_is_granted_without_host() {
        let mut audio = MockAudio::new();
        audio.expect_request_focus().never();
        audio.expect_abandon_focus().never();

        let (mut arbiter, _rx) = arbiter(audio, false);
        assert_eq!(arbiter.request().await.unwrap(), FocusGrant::Granted);
        assert!(!arbiter.is_held());

        arbiter.abandon().await;
    }

    #[tokio::test]
    async fn test_second_request_abandons_first() {
        let mut audio = MockAudio::new();
        audio
            .expect_request_focus()
            .times(2)
            .returning(|_| Ok(FocusGrant::Granted));
        audio.expect_abandon_focus().times(1).returning(|| Ok(()));

        let (mut arbiter, _rx) = arbiter(audio, true);
        arbiter.request().await.unwrap();
        assert!(arbiter.accepts(1));

        arbiter.request().await.unwrap();
        assert!(!arbiter.accepts(1));
        assert!(arbiter.accepts(2));
    }

    #[tokio::test]
    async fn test_denied_request_holds_nothing() {
        let mut audio = MockAudio::new();
        audio
            .expect_request_focus()
            .times(1)
            .returning(|_| Ok(FocusGrant::Denied));
        audio.expect_abandon_focus().never();

        let (mut arbiter, _rx) = arbiter(audio, true);
        assert_eq!(arbiter.request().await.unwrap(), FocusGrant::Denied);
        assert!(!arbiter.is_held());
        arbiter.abandon().await;
    }

    #[tokio::test]
    async fn test_listener_forwards_tagged_changes() {
        let mut audio = MockAudio::new();
        audio.expect_request_focus().times(1).returning(|listener| {
            listener.on_focus_change(FocusChange::LossTransient);
            Ok(FocusGrant::Granted)
        });

        let (mut arbiter, mut rx) = arbiter(audio, true);
        arbiter.request().await.unwrap();

        match rx.try_recv().unwrap() {
            Signal::Focus {
                registration,
                change,
                ..
            } => {
                assert_eq!(registration, 1);
                assert_eq!(change, FocusChange::LossTransient);
            }
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_abandon_failure_is_swallowed() {
        let mut audio = MockAudio::new();
        audio
            .expect_request_focus()
            .returning(|_| Ok(FocusGrant::Granted));
        audio
            .expect_abandon_focus()
            .times(1)
            .returning(|| Err(BridgeError::OperationFailed("gone".into())));

        let (mut arbiter, _rx) = arbiter(audio, true);
        arbiter.request().await.unwrap();
        arbiter.abandon().await;
        assert!(!arbiter.is_held());
    }
}
