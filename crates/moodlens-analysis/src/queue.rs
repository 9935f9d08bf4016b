//! Bounded background execution of entry analyses.
//!
//! Submitting never blocks the caller. Analyses of the same entry are not
//! serialized against each other, so when two overlap the later completion
//! overwrites the earlier one.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moodlens_core::AppConfig;
use serde::Serialize;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;

use crate::pipeline::MoodAnalyzer;

/// How one submitted analysis ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The result was saved.
    Succeeded,
    /// The entry no longer exists; nothing was written.
    Skipped,
    Failed,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    pub max_concurrent: usize,
    pub task_timeout: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            task_timeout: Duration::from_secs(120),
        }
    }
}

impl QueueSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent: config.analysis_max_concurrent,
            task_timeout: Duration::from_secs(config.analysis_task_timeout_secs),
        }
    }
}

/// Point-in-time copy of the queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueMetrics {
    pub submitted: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub in_flight: usize,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    succeeded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    in_flight: AtomicUsize,
}

impl Counters {
    fn record(&self, outcome: TaskOutcome) {
        let counter = match outcome {
            TaskOutcome::Succeeded => &self.succeeded,
            TaskOutcome::Skipped => &self.skipped,
            TaskOutcome::Failed => &self.failed,
            TaskOutcome::TimedOut => &self.timed_out,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Decrements the in-flight count when a task ends, including by panic.
struct InFlightGuard {
    counters: Arc<Counters>,
    idle: Arc<Notify>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.counters.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Fire-and-forget analysis runner with a concurrency bound and a per-task timeout.
#[derive(Clone)]
pub struct AnalysisQueue {
    analyzer: Arc<MoodAnalyzer>,
    permits: Arc<Semaphore>,
    task_timeout: Duration,
    counters: Arc<Counters>,
    idle: Arc<Notify>,
}

impl AnalysisQueue {
    /// `settings.max_concurrent` is clamped to at least one.
    #[must_use]
    pub fn new(analyzer: Arc<MoodAnalyzer>, settings: QueueSettings) -> Self {
        Self {
            analyzer,
            permits: Arc::new(Semaphore::new(settings.max_concurrent.max(1))),
            task_timeout: settings.task_timeout,
            counters: Arc::new(Counters::default()),
            idle: Arc::new(Notify::new()),
        }
    }

    /// Queue an analysis of `entry_id` and return immediately.
    ///
    /// The task waits for a permit, then runs under the task timeout. The
    /// handle may be dropped; the task keeps running.
    pub fn submit(&self, entry_id: i64) -> JoinHandle<TaskOutcome> {
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        self.counters.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlightGuard {
            counters: Arc::clone(&self.counters),
            idle: Arc::clone(&self.idle),
        };

        let analyzer = Arc::clone(&self.analyzer);
        let permits = Arc::clone(&self.permits);
        let counters = Arc::clone(&self.counters);
        let task_timeout = self.task_timeout;

        tokio::spawn(async move {
            let _guard = guard;
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => run_one(&analyzer, entry_id, task_timeout).await,
                Err(e) => {
                    tracing::error!(entry_id, error = %e, "analysis queue closed");
                    TaskOutcome::Failed
                }
            };
            counters.record(outcome);
            outcome
        })
    }

    /// Wait until every submitted task has finished.
    pub async fn drain(&self) {
        loop {
            let idle = self.idle.notified();
            if self.counters.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            idle.await;
        }
    }

    #[must_use]
    pub fn metrics(&self) -> QueueMetrics {
        let c = &self.counters;
        QueueMetrics {
            submitted: c.submitted.load(Ordering::Relaxed),
            succeeded: c.succeeded.load(Ordering::Relaxed),
            skipped: c.skipped.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
            timed_out: c.timed_out.load(Ordering::Relaxed),
            in_flight: c.in_flight.load(Ordering::Acquire),
        }
    }
}

async fn run_one(analyzer: &MoodAnalyzer, entry_id: i64, task_timeout: Duration) -> TaskOutcome {
    match tokio::time::timeout(task_timeout, analyzer.analyze_entry(entry_id)).await {
        Ok(Ok(Some(_))) => TaskOutcome::Succeeded,
        Ok(Ok(None)) => {
            tracing::info!(entry_id, "entry gone before analysis, skipped");
            TaskOutcome::Skipped
        }
        Ok(Err(e)) => {
            tracing::error!(entry_id, error = %e, "entry analysis failed");
            TaskOutcome::Failed
        }
        Err(_) => {
            tracing::warn!(
                entry_id,
                timeout_secs = task_timeout.as_secs(),
                "entry analysis timed out"
            );
            TaskOutcome::TimedOut
        }
    }
}
