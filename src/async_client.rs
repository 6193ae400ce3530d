//! Async wrapper around [`SwachhSdk`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use swachh_sdk::AsyncSwachhSdk;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = AsyncSwachhSdk::builder().from_env().build().await.unwrap();
//!
//!     // Run any sync SDK method via closure
//!     let user = sdk.run(|s| s.users().get_or_create("ana@example.com", "Ana")).await.unwrap();
//!
//!     // The three dashboard fetches share one join point
//!     let view = sdk.dashboard().await;
//!
//!     // Unread notifications every 30 seconds until `poll` is dropped
//!     let poll = sdk.poll_notifications(user.id, None).unwrap();
//!     let mut updates = poll.subscribe();
//!     updates.changed().await.unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::{DASHBOARD_FETCH_LIMIT, NOTIFICATION_POLL_PERIOD};
use crate::dashboard::{DashboardView, LOAD_ERROR_MESSAGE};
use crate::error::{Result, SwachhError};
use crate::models::{Notification, VerificationResult};
use crate::verify::{ImagePayload, VisionClient};
use crate::{SwachhSdk, SwachhSdkBuilder};

async fn run_blocking<F, T>(sdk: Arc<Mutex<SwachhSdk>>, f: F) -> Result<T>
where
    F: FnOnce(&SwachhSdk) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let guard = sdk
            .lock()
            .map_err(|_| SwachhError::InvalidArgument("SDK lock poisoned".into()))?;
        f(&guard)
    })
    .await
    .map_err(|e| SwachhError::InvalidArgument(format!("Task join error: {e}")))?
}

// ---------------------------------------------------------------------------
// AsyncSwachhSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for an [`AsyncSwachhSdk`]; takes the same options as
/// [`SwachhSdkBuilder`].
#[derive(Default)]
pub struct AsyncSwachhSdkBuilder {
    inner: SwachhSdkBuilder,
}

impl AsyncSwachhSdkBuilder {
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.data_dir(path);
        self
    }

    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.inner = self.inner.in_memory(in_memory);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.inner = self.inner.api_key(key);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.inner = self.inner.model(model);
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.inner = self.inner.api_base(base);
        self
    }

    pub fn from_env(mut self) -> Self {
        self.inner = self.inner.from_env();
        self
    }

    /// Build the async SDK. Opening the database runs on the blocking
    /// thread pool so it won't block the async event loop.
    pub async fn build(self) -> Result<AsyncSwachhSdk> {
        let builder = self.inner;
        tokio::task::spawn_blocking(move || {
            let sdk = builder.build()?;
            let vision = sdk.verifier().clone();
            Ok(AsyncSwachhSdk {
                inner: Arc::new(Mutex::new(sdk)),
                vision,
            })
        })
        .await
        .map_err(|e| SwachhError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncSwachhSdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`SwachhSdk`].
///
/// The SDK sits behind a [`Mutex`] since the DuckDB connection is not
/// `Sync`. Verification holds its own client handle and never takes the
/// lock, so a slow vision call does not stall queries.
pub struct AsyncSwachhSdk {
    inner: Arc<Mutex<SwachhSdk>>,
    vision: VisionClient,
}

impl AsyncSwachhSdk {
    pub fn builder() -> AsyncSwachhSdkBuilder {
        AsyncSwachhSdkBuilder::default()
    }

    /// Wrap an already built SDK.
    pub fn from_sdk(sdk: SwachhSdk) -> Self {
        let vision = sdk.verifier().clone();
        Self {
            inner: Arc::new(Mutex::new(sdk)),
            vision,
        }
    }

    /// Run a sync SDK operation on the blocking thread pool.
    ///
    /// The closure receives an `&SwachhSdk` reference and should return
    /// a `Result<T>`.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&SwachhSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(self.inner.clone(), f).await
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |s| s.sql(&query, &params)).await
    }

    /// Issue the reports, rewards and tasks fetches concurrently and
    /// aggregate them once all three are in. Any failure yields the
    /// fallback view.
    pub async fn dashboard(&self) -> DashboardView {
        let fetched = tokio::try_join!(
            self.run(|s| s.reports().recent(DASHBOARD_FETCH_LIMIT)),
            self.run(|s| s.rewards().all()),
            self.run(|s| s.tasks().list(DASHBOARD_FETCH_LIMIT)),
        );
        match fetched {
            Ok((reports, rewards, tasks)) => {
                DashboardView::from_records(&reports, &rewards, &tasks)
            }
            Err(e) => {
                error!(error = %e, "error fetching impact data");
                DashboardView::fallback(LOAD_ERROR_MESSAGE)
            }
        }
    }

    /// Classify an image without holding the SDK lock.
    pub async fn verify(&self, image: ImagePayload) -> Result<VerificationResult> {
        let vision = self.vision.clone();
        tokio::task::spawn_blocking(move || vision.verify(&image))
            .await
            .map_err(|e| SwachhError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Start polling `user_id`'s unread notifications every `period`
    /// (30 seconds by default). Must be called inside a Tokio runtime.
    pub fn poll_notifications(
        &self,
        user_id: i64,
        period: Option<Duration>,
    ) -> Result<NotificationPoll> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| SwachhError::InvalidArgument(format!("No Tokio runtime: {e}")))?;
        let period = period.unwrap_or(NOTIFICATION_POLL_PERIOD);
        if period.is_zero() {
            return Err(SwachhError::InvalidArgument("poll period must be positive".into()));
        }

        let (tx, rx) = watch::channel(NotificationSnapshot::default());
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();
        let sdk = self.inner.clone();

        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                let fetched =
                    run_blocking(sdk.clone(), move |s| s.notifications().unread(user_id)).await;

                // The poll may have been stopped while the fetch was running
                if !flag.load(Ordering::Acquire) || tx.is_closed() {
                    break;
                }
                let snapshot = match fetched {
                    Ok(notifications) => {
                        debug!(user_id, unread = notifications.len(), "polled notifications");
                        NotificationSnapshot {
                            notifications,
                            error: None,
                            fetched_at: Some(Utc::now()),
                        }
                    }
                    Err(e) => {
                        warn!(user_id, error = %e, "error fetching notifications");
                        let previous = tx.borrow().notifications.clone();
                        NotificationSnapshot {
                            notifications: previous,
                            error: Some(format!("Error fetching notifications: {e}")),
                            fetched_at: Some(Utc::now()),
                        }
                    }
                };
                if tx.send(snapshot).is_err() {
                    break;
                }
            }
            debug!(user_id, "notification poll finished");
        });

        info!(user_id, period_secs = period.as_secs_f64(), "notification poll started");
        Ok(NotificationPoll {
            rx,
            active,
            task: Some(task),
        })
    }

    /// Mark one notification read.
    pub async fn mark_notification_read(&self, id: i64) -> Result<()> {
        self.run(move |s| s.notifications().mark_read(id)).await
    }

    /// Close the SDK, releasing all resources.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            let sdk = self
                .inner
                .lock()
                .map_err(|_| SwachhError::InvalidArgument("SDK lock poisoned".into()))?;
            drop(sdk);
            Ok(())
        })
        .await
        .map_err(|e| SwachhError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// NotificationPoll
// ---------------------------------------------------------------------------

/// Latest result of a notification poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationSnapshot {
    pub notifications: Vec<Notification>,
    /// Set when the most recent fetch failed; the list is then the last
    /// successful one.
    pub error: Option<String>,
    /// `None` until the first fetch completes.
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Handle to a running notification poll. Dropping it stops the poll.
pub struct NotificationPoll {
    rx: watch::Receiver<NotificationSnapshot>,
    active: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl NotificationPoll {
    /// A receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<NotificationSnapshot> {
        self.rx.clone()
    }

    pub fn latest(&self) -> NotificationSnapshot {
        self.rx.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop polling. Nothing is published after this returns.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for NotificationPoll {
    fn drop(&mut self) {
        self.stop();
    }
}
