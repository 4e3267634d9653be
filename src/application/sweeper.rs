//! EvictionSweeper - background task running the engine's sweeps.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 1h | Time between sweeps (from `EvictionConfig`) |
//!
//! ## Graceful Shutdown
//!
//! The task listens on a `watch` channel. Shutdown never waits for the
//! next tick and never runs a final sweep: the store is process-local and
//! has nothing to flush.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

use super::engine::OutcomeEngine;

/// Periodic idle/capacity sweep over one engine.
pub struct EvictionSweeper {
    engine: Arc<OutcomeEngine>,
    interval: Duration,
}

impl EvictionSweeper {
    /// Sweeps at the engine policy's interval.
    pub fn new(engine: Arc<OutcomeEngine>) -> Self {
        let interval = engine.policy().sweep_interval();
        Self { engine, interval }
    }

    /// Sweeps at a custom interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the sweep loop until shutdown signal is received.
    ///
    /// The first sweep happens one interval after start. Returns the number
    /// of sweeps performed.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sweeps = 0;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender also means stop.
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!(sweeps, "Eviction sweeper stopped");
                        return sweeps;
                    }
                }

                _ = ticker.tick() => {
                    self.engine.sweep_now();
                    sweeps += 1;
                }
            }
        }
    }

    /// Spawns the loop on the current tokio runtime.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown, receiver) = watch::channel(false);
        tracing::info!(interval_secs = self.interval.as_secs_f64(), "Eviction sweeper started");
        let task = tokio::spawn(async move { self.run(receiver).await });
        SweeperHandle { shutdown, task }
    }
}

/// Handle to a running sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it, returning the number
    /// of sweeps it performed.
    pub async fn shutdown(self) -> Result<u64, JoinError> {
        // Err only when the task already ended; joining reports why.
        let _ = self.shutdown.send(true);
        self.task.await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
