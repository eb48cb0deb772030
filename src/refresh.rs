//! Periodic refresh of recent activity
//!
//! [`ActivityRefreshJob::spawn`] runs [`ActivityAggregator::get_recent_activity`]
//! on a fixed interval in a background task and publishes every report through
//! a `watch` channel. The returned [`RefreshHandle`] reads the latest report,
//! requests an out-of-schedule refresh, and stops the task, either explicitly
//! with [`RefreshHandle::shutdown`] or implicitly when the handle is dropped.
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use activityscan::ActivityRefreshJob;
//!
//! let handle = ActivityRefreshJob::spawn(aggregator, None, Duration::from_secs(60));
//! let mut reports = handle.subscribe();
//! reports.changed().await?;
//! println!("{:?}", reports.borrow().as_ref().map(|r| r.records.len()));
//! handle.shutdown().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::activity::{ActivityAggregator, ActivityReport};

/// Latest published report, `None` until the first run completes
pub type LatestReport = Option<Arc<ActivityReport>>;

type Responder = oneshot::Sender<Arc<ActivityReport>>;

enum Command {
    RefreshNow { responder: Responder },
}

/// Background refresh task.
pub struct ActivityRefreshJob;

impl ActivityRefreshJob {
    /// Spawn the refresh loop on the current tokio runtime.
    ///
    /// The first run starts immediately; later runs follow `interval`, delayed
    /// rather than bunched up when a run overruns it.
    pub fn spawn(
        aggregator: ActivityAggregator,
        pair_override: Option<String>,
        interval: Duration,
    ) -> RefreshHandle {
        let (reports_tx, reports_rx) = watch::channel::<LatestReport>(None);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (tx, mut rx) = mpsc::channel::<Command>(4);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_ms = interval.as_millis(), "Activity refresh started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    command = rx.recv() => match command {
                        Some(Command::RefreshNow { responder }) => {
                            let report = Self::refresh(&aggregator, pair_override.as_deref(), &reports_tx).await;
                            if responder.send(report).is_err() {
                                error!("Failed to send refresh response");
                            }
                        }
                        None => break,
                    },
                    _ = ticker.tick() => {
                        Self::refresh(&aggregator, pair_override.as_deref(), &reports_tx).await;
                    }
                }
            }

            info!("Activity refresh stopped");
        });

        RefreshHandle {
            reports: reports_rx,
            tx,
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn refresh(
        aggregator: &ActivityAggregator,
        pair_override: Option<&str>,
        reports: &watch::Sender<LatestReport>,
    ) -> Arc<ActivityReport> {
        let report = Arc::new(aggregator.get_recent_activity(pair_override).await);
        debug!(records = report.records.len(), "Publishing activity report");
        reports.send_replace(Some(report.clone()));
        report
    }
}

/// Control and observation side of a running [`ActivityRefreshJob`].
///
/// Dropping the handle stops the background task.
#[derive(Debug)]
pub struct RefreshHandle {
    reports: watch::Receiver<LatestReport>,
    tx: mpsc::Sender<Command>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::RefreshNow { .. } => f.write_str("RefreshNow"),
        }
    }
}

impl RefreshHandle {
    /// The most recently published report
    pub fn latest(&self) -> LatestReport {
        self.reports.borrow().clone()
    }

    /// A receiver notified on every published report
    pub fn subscribe(&self) -> watch::Receiver<LatestReport> {
        self.reports.clone()
    }

    /// Run a refresh now and wait for its report.
    ///
    /// Returns `None` if the task has stopped.
    pub async fn refresh_now(&self) -> Option<Arc<ActivityReport>> {
        let (responder, response) = oneshot::channel();
        self.tx.send(Command::RefreshNow { responder }).await.ok()?;
        response.await.ok()
    }

    /// Whether the background task has finished
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the task and wait for it to finish.
    ///
    /// A run already in progress completes before the task exits.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Activity refresh task ended abnormally");
        }
    }
}
