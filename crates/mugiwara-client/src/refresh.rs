//! Fixed-interval re-fetching.
//!
//! There is no push channel: new messages show up when the conversation list
//! or the open thread is fetched again. Each tick starts its fetch without
//! waiting for earlier ones, so responses can complete out of order. Every
//! fetch carries a ticket from a [`ResponseGate`] and only a ticket newer than
//! the last delivered one is published; late, stale responses are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Monotonic request counter.
#[derive(Debug, Default)]
pub struct ResponseGate {
    issued: AtomicU64,
    delivered: AtomicU64,
}

impl ResponseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a request about to be sent. Tickets start at 1.
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// `true` if `ticket` is newer than anything delivered so far, in which
    /// case it becomes the latest.
    pub fn accept(&self, ticket: u64) -> bool {
        self.delivered.fetch_max(ticket, Ordering::SeqCst) < ticket
    }
}

pub struct Poller;

impl Poller {
    /// Run `fetch` on the blocking pool every `interval`, starting now.
    pub fn spawn<T, F>(interval: Duration, fetch: F) -> PollHandle<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::spawn_with_ticket(interval, move |_| fetch())
    }

    pub(crate) fn spawn_with_ticket<T, F>(interval: Duration, fetch: F) -> PollHandle<T>
    where
        T: Send + Sync + 'static,
        F: Fn(u64) -> T + Send + Sync + 'static,
    {
        let (updates_tx, updates_rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let updates_tx = Arc::new(updates_tx);
        let gate = Arc::new(ResponseGate::new());
        let fetch = Arc::new(fetch);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut shutdown = shutdown_rx.clone();

            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {
                        let ticket = gate.issue();
                        let fetch = Arc::clone(&fetch);
                        let gate = Arc::clone(&gate);
                        let updates_tx = Arc::clone(&updates_tx);
                        let cancelled = shutdown_rx.clone();

                        tokio::spawn(async move {
                            let value = match tokio::task::spawn_blocking(move || fetch(ticket)).await {
                                Ok(value) => value,
                                Err(e) => {
                                    warn!(ticket, error = %e, "poll fetch panicked");
                                    return;
                                }
                            };
                            if *cancelled.borrow() {
                                debug!(ticket, "poll response after cancel, dropped");
                                return;
                            }
                            if gate.accept(ticket) {
                                updates_tx.send_replace(Some(value));
                            } else {
                                debug!(ticket, "stale poll response, dropped");
                            }
                        });
                    }
                }
            }

            debug!("poller stopped");
        });

        PollHandle {
            shutdown: shutdown_tx,
            updates: updates_rx,
            task,
        }
    }
}

/// Owner of a running poller. Dropping it stops the poller.
pub struct PollHandle<T> {
    shutdown: watch::Sender<bool>,
    updates: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

impl<T> PollHandle<T> {
    /// Receiver of the latest accepted result (`None` until the first one).
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.updates.clone()
    }

    pub fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.updates.borrow().clone()
    }

    /// Stop ticking. Fetches still in flight finish but are not published.
    pub fn cancel(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
