//! Cancellable periodic fetches and stale-response protection.
//!
//! A poll can overlap a manual refresh, and responses can arrive out of
//! order. [`StaleGuard`] hands every fetch a generation ticket; a response
//! is applied only if nothing newer has been applied already.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::lifecycle::Lifecycle;

/// Source of fetch generations for one [`StaleGuard`]. Generations only
/// grow, so a larger one always belongs to a later request.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
    next: Arc<AtomicU64>,
}

impl GenerationClock {
    /// The first fetch gets generation 1; 0 means "nothing applied yet".
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new fetch.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }
}

/// Generation of a fetch, taken before the request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Latest-wins filter for responses of one data source.
///
/// Call [`StaleGuard::try_apply`] while holding the lock of whatever the
/// response mutates, so the check and the mutation are atomic.
#[derive(Debug, Default, Clone)]
pub struct StaleGuard {
    clock: GenerationClock,
    applied: Arc<AtomicU64>,
}

impl StaleGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket for a fetch about to start.
    pub fn begin(&self) -> Ticket {
        Ticket(self.clock.next())
    }

    /// Record `ticket` as applied; false when a newer one already was.
    pub fn try_apply(&self, ticket: Ticket) -> bool {
        self.applied.fetch_max(ticket.0, Ordering::AcqRel) < ticket.0
    }

    /// Generation of the newest applied response (0 before any).
    #[must_use]
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Acquire)
    }
}

/// A running periodic fetch.
#[derive(Debug, Clone)]
pub struct Poller {
    name: &'static str,
    cancel: CancellationToken,
}

impl Poller {
    /// Stop polling. A fetch in flight is dropped.
    pub fn stop(&self) {
        debug!(poller = self.name, "Stopping poller");
        self.cancel.cancel();
    }

    /// Whether the poller has been stopped (directly or by its lifecycle).
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Spawn a poller running `tick` immediately and then every `period`.
    ///
    /// Ticks never overlap: a slow fetch delays the next tick instead of
    /// stacking requests.
    pub fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        lifecycle: &Lifecycle,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = lifecycle.child_token();
        let token = cancel.clone();
        let period = period.max(Duration::from_millis(1));

        lifecycle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(poller = name, period_secs = period.as_secs(), "Poller started");

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    () = tick() => {}
                }
            }

            debug!(poller = name, "Poller stopped");
        });

        Self { name, cancel }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}
