//! Inter-category rate limiting.
//!
//! A one-slot scheduled-ticket limiter: each `wait` resolves no earlier than
//! `interval` after the previous ticket. Waiting races a shutdown signal so a
//! long delay never holds up cancellation.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Receiver side of the shutdown signal; `true` means stop.
pub type Shutdown = watch::Receiver<bool>;

/// Create a shutdown signal pair.
pub fn shutdown_channel() -> (watch::Sender<bool>, Shutdown) {
    watch::channel(false)
}

/// Whether shutdown has been requested.
pub fn is_shutdown(shutdown: &Shutdown) -> bool {
    *shutdown.borrow()
}

/// Why a throttle wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The next slot is available
    Ready,
    /// Shutdown was requested while waiting
    Cancelled,
}

pub struct Throttle {
    interval: Option<Interval>,
}

impl Throttle {
    /// A zero delay disables throttling.
    pub fn new(delay: Duration) -> Self {
        let interval = (!delay.is_zero()).then(|| {
            // First tick fires one period from now, not immediately.
            let mut interval = tokio::time::interval_at(Instant::now() + delay, delay);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self { interval }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Wait for the next slot, or return early on shutdown.
    pub async fn wait(&mut self, shutdown: &mut Shutdown) -> Tick {
        if is_shutdown(shutdown) {
            return Tick::Cancelled;
        }
        let Some(interval) = self.interval.as_mut() else {
            return Tick::Ready;
        };

        loop {
            tokio::select! {
                _ = interval.tick() => return Tick::Ready,
                changed = shutdown.changed() => match changed {
                    Ok(()) if is_shutdown(shutdown) => return Tick::Cancelled,
                    // Update that still says "run": keep racing.
                    Ok(()) => continue,
                    // Sender dropped: no shutdown can arrive anymore.
                    Err(_) => {
                        interval.tick().await;
                        return Tick::Ready;
                    }
                },
            }
        }
    }
}
