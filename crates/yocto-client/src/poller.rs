//! Self-refreshing status value.
//!
//! [`StatusPoller`] keeps the latest [`StatusSnapshot`] of the printer host
//! and pushes every new snapshot to its subscribers. It starts polling when
//! the first subscriber attaches and then runs until stopped or dropped.
//!
//! ## Tick
//!
//! 1. Fetch `GET status`.
//! 2. On success publish the snapshot (with `host_connected: true`).
//! 3. On any failure publish [`StatusSnapshot::default_status`] and log it.
//! 4. Sleep the poll interval, then repeat.
//!
//! The sleep starts after the request settled, so a slow host stretches the
//! period instead of stacking requests: at most one request of the tick chain
//! is in flight. Failures are retried forever at the same cadence.
//!
//! Commands trigger extra refreshes through a [`RefreshHandle`]. Those run
//! outside the tick chain and may overlap a regular tick.

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use yocto_core::StatusSnapshot;

use crate::error::Result;

/// Default delay between the end of one status request and the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default number of updates buffered per subscriber.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Anything that can produce a fresh status snapshot.
///
/// Implemented by [`ApiClient`](crate::api::ApiClient); tests substitute
/// scripted sources.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    /// Fetch the current status, already marked as host-connected.
    async fn fetch_status(&self) -> Result<StatusSnapshot>;
}

/// Configuration for a [`StatusPoller`].
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay after each settled request before the next one
    pub interval: Duration,

    /// Updates buffered per subscriber before it starts skipping
    pub channel_capacity: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl PollerConfig {
    /// Set the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the per-subscriber buffer size. Clamped to at least 1.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

/// State shared by the poll loop, refresh handles and the poller itself.
struct Shared {
    source: Box<dyn StatusSource>,
    current: RwLock<StatusSnapshot>,
    updates: broadcast::Sender<StatusSnapshot>,
}

impl Shared {
    async fn refresh(&self) {
        let outcome = self.source.fetch_status().await;
        self.apply(outcome);
    }

    fn apply(&self, outcome: Result<StatusSnapshot>) {
        match outcome {
            Ok(snapshot) => {
                debug!(%snapshot, "status refreshed");
                self.publish(snapshot);
            }
            Err(e) => {
                error!(error = %e, "status refresh failed, publishing default status");
                self.publish(StatusSnapshot::default_status());
            }
        }
    }

    fn publish(&self, snapshot: StatusSnapshot) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        // Err only means nobody is subscribed right now
        let _ = self.updates.send(snapshot);
    }
}

/// Reactive, self-refreshing status of the printer host.
///
/// Idle until [`subscribe`](Self::subscribe) is called for the first time;
/// that call spawns the poll loop on the current tokio runtime and performs
/// the first refresh immediately.
pub struct StatusPoller {
    shared: Arc<Shared>,
    config: PollerConfig,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusPoller {
    /// Create an idle poller over the given source.
    pub fn new(source: impl StatusSource, config: PollerConfig) -> Self {
        let (updates, _) = broadcast::channel(config.channel_capacity.max(1));
        let (shutdown, _) = watch::channel(false);

        Self {
            shared: Arc::new(Shared {
                source: Box::new(source),
                current: RwLock::new(StatusSnapshot::default_status()),
                updates,
            }),
            config,
            shutdown,
            task: Mutex::new(None),
        }
    }

    /// Subscribe to status updates, starting the poll loop on first use.
    ///
    /// The subscription sees every snapshot published after this call,
    /// identical consecutive snapshots included. Use [`current`](Self::current)
    /// for the value at subscription time.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime while the poller is idle.
    pub fn subscribe(&self) -> StatusSubscription {
        let rx = self.shared.updates.subscribe();

        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_none() {
            info!(
                interval_ms = self.config.interval.as_millis() as u64,
                "Starting status poller"
            );
            let shared = Arc::clone(&self.shared);
            let shutdown = self.shutdown.subscribe();
            let interval = self.config.interval;
            *task = Some(tokio::spawn(run_loop(shared, interval, shutdown)));
        }

        StatusSubscription { rx }
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> StatusSnapshot {
        self.shared
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Handle for requesting out-of-band refreshes, e.g. after a command.
    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Returns true while the poll loop is running.
    pub fn is_polling(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stop scheduling ticks.
    ///
    /// A request already in flight completes and its result is discarded.
    /// The poller does not restart afterwards.
    pub fn stop(&self) {
        if !*self.shutdown.borrow() {
            info!("Stopping status poller");
        }
        self.shutdown.send_replace(true);
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

async fn run_loop(shared: Arc<Shared>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let outcome = shared.source.fetch_status().await;

        if *shutdown.borrow() {
            debug!("poller stopped while a request was in flight, discarding result");
            break;
        }
        shared.apply(outcome);

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    debug!("status poll loop exited");
}

/// Receiving end of a [`StatusPoller`] subscription.
pub struct StatusSubscription {
    rx: broadcast::Receiver<StatusSnapshot>,
}

impl StatusSubscription {
    /// Wait for the next published snapshot.
    ///
    /// Returns `None` once the poller has been dropped and its loop exited.
    /// A subscriber that fell behind skips the missed snapshots.
    pub async fn next(&mut self) -> Option<StatusSnapshot> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "status subscriber lagging, skipped updates");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Requests an immediate status refresh from a [`StatusPoller`].
///
/// Holds only a weak reference: once the poller is dropped, refreshes are
/// no-ops.
#[derive(Clone)]
pub struct RefreshHandle {
    shared: Weak<Shared>,
}

impl RefreshHandle {
    /// Spawn one refresh in the background.
    ///
    /// Returns `None` if the poller no longer exists. Dropping the returned
    /// handle detaches the refresh; it still completes and publishes.
    pub fn refresh_now(&self) -> Option<JoinHandle<()>> {
        let shared = self.shared.upgrade()?;
        Some(tokio::spawn(async move {
            shared.refresh().await;
        }))
    }

    /// Refresh and wait until the new snapshot has been published.
    ///
    /// Returns false if the poller no longer exists.
    pub async fn refresh(&self) -> bool {
        match self.shared.upgrade() {
            Some(shared) => {
                shared.refresh().await;
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshHandle")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}
