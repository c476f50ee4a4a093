//! # Playback Service
//!
//! The single task that owns the session. It multiplexes facade requests and
//! internal signals with `tokio::select!` and handles each one to completion
//! before looking at the next, which is what keeps state transitions
//! serialised without locks.
//!
//! Signals are polled first so a callback queued before a request is always
//! applied before that request.

use core_runtime::events::{CoreEvent, SessionEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, trace, warn};

use crate::command::{Command, CommandOutcome};
use crate::config::PlayerConfig;
use crate::controller::{EventOutbox, PlaybackController, SessionBridges, SessionSnapshot};
use crate::error::{PlaybackError, Result};
use crate::signal::{Signal, SignalReceiver, SignalSender};

/// Facade -> service message.
pub(crate) enum Request {
    Command {
        command: Command,
        reply: oneshot::Sender<Result<CommandOutcome>>,
    },
    Snapshot {
        reply: oneshot::Sender<Option<SessionSnapshot>>,
    },
}

pub(crate) struct PlaybackService {
    name: String,
    bridges: SessionBridges,
    requests: mpsc::Receiver<Request>,
    signals: SignalReceiver,
    signal_tx: SignalSender,
    outbox: Arc<EventOutbox>,
    controller: Option<PlaybackController>,
}

impl PlaybackService {
    pub fn new(
        name: String,
        bridges: SessionBridges,
        requests: mpsc::Receiver<Request>,
        outbox: Arc<EventOutbox>,
    ) -> Self {
        let (signal_tx, signals) = mpsc::unbounded_channel();
        Self {
            name,
            bridges,
            requests,
            signals,
            signal_tx,
            outbox,
            controller: None,
        }
    }

    /// Run until every facade handle is dropped, then tear down any session.
    pub async fn run(mut self) {
        debug!(channel = %self.name, "Playback service started");

        loop {
            tokio::select! {
                biased;

                Some(signal) = self.signals.recv() => self.handle_signal(signal).await,
                request = self.requests.recv() => match request {
                    Some(request) => self.handle_request(request).await,
                    None => break,
                },
            }
        }

        if let Some(mut controller) = self.controller.take() {
            controller.destroy().await;
            self.finish_session(&controller).await;
        }
        debug!(channel = %self.name, "Playback service stopped");
    }

    async fn handle_request(&mut self, request: Request) {
        match request {
            Request::Command { command, reply } => {
                let result = self.handle_command(command).await;
                if reply.send(result).is_err() {
                    trace!("Command caller went away before the reply");
                }
            }
            Request::Snapshot { reply } => {
                let _ = reply.send(self.controller.as_ref().map(PlaybackController::snapshot));
            }
        }
    }

    #[instrument(skip(self, command), fields(command = command.name(), channel = %self.name))]
    async fn handle_command(&mut self, command: Command) -> Result<CommandOutcome> {
        match command {
            Command::Create(config) => {
                if self.controller.is_some() {
                    debug!("Session already exists; create ignored");
                    return Ok(CommandOutcome::Ignored);
                }
                self.create_session(config).await
            }
            Command::Destroy => match self.controller.take() {
                Some(mut controller) => {
                    controller.destroy().await;
                    self.finish_session(&controller).await;
                    Ok(CommandOutcome::Applied)
                }
                None => Ok(CommandOutcome::Ignored),
            },
            command => match self.controller.as_mut() {
                Some(controller) => {
                    controller.handle(command).await?;
                    Ok(CommandOutcome::Applied)
                }
                None => {
                    debug!("No active session; command ignored");
                    Ok(CommandOutcome::Ignored)
                }
            },
        }
    }

    async fn create_session(&mut self, config: PlayerConfig) -> Result<CommandOutcome> {
        config.validate().map_err(PlaybackError::InvalidConfig)?;

        let controller = PlaybackController::new(
            config,
            &self.bridges,
            self.signal_tx.clone(),
            Arc::clone(&self.outbox),
        );
        let session_id = controller.id();
        debug!(session = %session_id, "Session created");

        self.outbox.reset_state();
        self.outbox
            .emit(CoreEvent::Session(SessionEvent::Created {
                session_id: session_id.to_string(),
            }))
            .await;
        self.controller = Some(controller);
        Ok(CommandOutcome::Applied)
    }

    async fn finish_session(&self, controller: &PlaybackController) {
        debug!(session = %controller.id(), state = %controller.state(), "Session finished");
        self.outbox.reset_state();
        self.outbox
            .emit(CoreEvent::Session(SessionEvent::Destroyed {
                session_id: controller.id().to_string(),
            }))
            .await;
    }

    async fn handle_signal(&mut self, signal: Signal) {
        let Some(controller) = self.controller.as_mut() else {
            trace!(?signal, "Signal with no active session");
            return;
        };

        if signal.session() != controller.id() {
            trace!(?signal, "Dropping signal from a previous session");
            return;
        }

        controller.handle_signal(signal).await;
    }
}

impl Drop for PlaybackService {
    fn drop(&mut self) {
        if self.controller.is_some() {
            warn!(channel = %self.name, "Playback service dropped with a live session");
        }
    }
}
