//! Cancellable one-second countdown.
//!
//! The countdown is a spawned tick task owned by the engine. Cancelling
//! (or dropping) the handle aborts the task, so no tick can be delivered
//! after the owner has left the `Playing` phase — the stale-tick
//! double-submit race is impossible by construction, not guarded by
//! incidental checks downstream.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to a running countdown. One tick arrives per second, at most
/// `seconds` ticks in total.
#[derive(Debug)]
pub struct Countdown {
    ticks: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawn the tick task.
    pub fn start(seconds: u32) -> Self {
        let (tx, ticks) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            for _ in 0..seconds {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self { ticks, handle }
    }

    /// Wait for the next tick. `None` once the countdown is exhausted or
    /// cancelled.
    pub async fn tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    /// Stop the tick task immediately.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_delivers_one_tick_per_second() {
        let mut countdown = Countdown::start(3);
        assert!(countdown.tick().await.is_some());
        assert!(countdown.tick().await.is_some());
        assert!(countdown.tick().await.is_some());
        // Exhausted — sender dropped.
        assert!(countdown.tick().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let mut countdown = Countdown::start(60);
        assert!(countdown.tick().await.is_some());
        countdown.cancel();
        // At most one buffered tick can remain; after that the channel
        // is closed for good.
        while countdown.tick().await.is_some() {}
        assert!(countdown.tick().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_second_countdown_never_ticks() {
        let mut countdown = Countdown::start(0);
        assert!(countdown.tick().await.is_none());
    }
}
