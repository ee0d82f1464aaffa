//! Page-scoped task ownership.
//!
//! Every timer, poller and deferred action a page starts is spawned through
//! its [`Lifecycle`]. Shutting the lifecycle down cancels all of them, in
//! flight requests included, and waits until they have exited.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Owner of the background tasks belonging to one page.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    cancel: CancellationToken,
    tasks: TaskTracker,
}

impl Lifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task that is dropped at its next await point once the
    /// lifecycle is cancelled.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.tasks.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = task => {}
            }
        });
    }

    /// Run `action` after `delay`, unless the lifecycle ends first.
    pub fn spawn_after<F>(&self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
    }

    /// A token cancelled together with this lifecycle.
    #[must_use]
    pub fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of tasks still running.
    #[must_use]
    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Cancel every task and wait for them to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tasks.close();
        self.tasks.wait().await;
    }
}
