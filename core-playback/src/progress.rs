//! Periodic position/buffer sampling.
//!
//! The reporter never touches the engine itself. It only queues
//! [`Signal::ProgressTick`]s; the service samples the engine when a tick
//! arrives and then asks for the next one. Each start bumps a generation so
//! ticks scheduled before a `stop` are recognised as stale.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::session::SessionId;
use crate::signal::{Signal, SignalSender};

pub(crate) struct ProgressReporter {
    session: SessionId,
    signals: SignalSender,
    generation: u64,
    running: Option<CancellationToken>,
}

impl ProgressReporter {
    pub fn new(session: SessionId, signals: SignalSender) -> Self {
        Self {
            session,
            signals,
            generation: 0,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Whether a tick of `generation` belongs to the current run.
    pub fn accepts(&self, generation: u64) -> bool {
        self.running.is_some() && generation == self.generation
    }

    /// Start sampling with an immediate tick. No-op when already running.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }

        self.generation += 1;
        self.running = Some(CancellationToken::new());
        trace!(generation = self.generation, "Progress reporting started");
        self.send_tick();
    }

    /// Queue the next tick after `interval`.
    pub fn schedule_next(&self, interval: Duration) {
        let Some(token) = self.running.clone() else {
            return;
        };

        let signals = self.signals.clone();
        let tick = Signal::ProgressTick {
            session: self.session,
            generation: self.generation,
        };

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(interval) => {
                    let _ = signals.send(tick);
                }
            }
        });
    }

    /// Cancel the pending tick, if any.
    pub fn stop(&mut self) {
        if let Some(token) = self.running.take() {
            token.cancel();
            trace!(generation = self.generation, "Progress reporting stopped");
        }
    }

    fn send_tick(&self) {
        let _ = self.signals.send(Signal::ProgressTick {
            session: self.session,
            generation: self.generation,
        });
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn reporter() -> (ProgressReporter, mpsc::UnboundedReceiver<Signal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ProgressReporter::new(SessionId::new(), tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn start_sends_immediate_tick_once() {
        let (mut reporter, mut rx) = reporter();

        reporter.start();
        reporter.start();

        assert!(matches!(
            rx.try_recv(),
            Ok(Signal::ProgressTick { generation: 1, .. })
        ));
        assert!(rx.try_recv().is_err());
        assert!(reporter.accepts(1));
    }

    #[tokio::test(start_paused = true)]
    async fn next_tick_arrives_after_interval() {
        let (mut reporter, mut rx) = reporter();
        reporter.start();
        let _ = rx.recv().await;

        reporter.schedule_next(Duration::from_millis(200));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(matches!(rx.try_recv(), Ok(Signal::ProgressTick { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_tick() {
        let (mut reporter, mut rx) = reporter();
        reporter.start();
        let _ = rx.recv().await;

        reporter.schedule_next(Duration::from_millis(200));
        reporter.stop();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(rx.try_recv().is_err());
        assert!(!reporter.is_running());
        assert!(!reporter.accepts(1));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_uses_new_generation() {
        let (mut reporter, mut rx) = reporter();
        reporter.start();
        reporter.stop();
        reporter.start();

        assert!(matches!(
            rx.try_recv(),
            Ok(Signal::ProgressTick { generation: 1, .. })
        ));
        assert!(matches!(
            rx.try_recv(),
            Ok(Signal::ProgressTick { generation: 2, .. })
        ));
        assert!(!reporter.accepts(1));
        assert!(reporter.accepts(2));
    }
}
