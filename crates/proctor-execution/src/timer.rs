//! Countdown timer.
//!
//! A cancellable 1 Hz tick source feeding the session actor. Every run gets a
//! new generation number; ticks carry it so the actor can drop ticks that
//! were already queued when the timer was stopped.

use crate::command::SessionCommand;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub struct CountdownTimer {
    period: Duration,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl CountdownTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            cancel: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a tick from `generation` should reach the engine.
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }

    /// Starts ticking into `commands`. No-op returning `false` if already
    /// running.
    pub fn start(&mut self, commands: mpsc::Sender<SessionCommand>) -> bool {
        if self.is_running() {
            return false;
        }

        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        let period = self.period;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            // A suspended host catches up instead of stretching the exam
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if commands.send(SessionCommand::Tick { generation }).await.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("[CountdownTimer] Run {} stopped", generation);
        });

        tracing::debug!("[CountdownTimer] Run {} started ({:?})", generation, period);
        true
    }

    /// Stops the tick source. Idempotent; returns whether it was running.
    pub fn stop(&mut self) -> bool {
        match self.cancel.take() {
            Some(token) => {
                token.cancel();
                self.generation += 1;
                true
            }
            None => false,
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
