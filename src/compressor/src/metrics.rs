//! Executor metrics tracking
//!
//! Thread-safe counters for rewrite attempts, using atomics so a single
//! handle can be cloned into every component that reports.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Thread-safe metrics for tracking rewrite attempts
#[derive(Debug, Clone)]
pub struct ExecutorMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    jobs_started: AtomicUsize,
    jobs_succeeded: AtomicUsize,
    jobs_failed: AtomicUsize,
    attempts_started: AtomicUsize,
    preemptions: AtomicUsize,
    engine_out_of_memory: AtomicUsize,
    budget_shrinks: AtomicUsize,
    floor_failures: AtomicUsize,
    fast_path_moves: AtomicUsize,
    total_duration_ms: AtomicU64,
}

impl Default for ExecutorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub fn record_job_start(&self) {
        self.inner.jobs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_success(&self, duration: Duration) {
        self.inner.jobs_succeeded.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_duration_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_job_failure(&self) {
        self.inner.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attempt(&self) {
        self.inner.attempts_started.fetch_add(1, Ordering::Relaxed);
    }

    /// The supervisor killed an attempt on host memory pressure
    pub fn record_preemption(&self) {
        self.inner.preemptions.fetch_add(1, Ordering::Relaxed);
    }

    /// The worker itself reported running out of memory
    pub fn record_engine_out_of_memory(&self) {
        self.inner
            .engine_out_of_memory
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shrink(&self) {
        self.inner.budget_shrinks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_floor_failure(&self) {
        self.inner.floor_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// An empty input was moved instead of rewritten
    pub fn record_fast_path(&self) {
        self.inner.fast_path_moves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn jobs_started(&self) -> usize {
        self.inner.jobs_started.load(Ordering::Relaxed)
    }

    pub fn jobs_succeeded(&self) -> usize {
        self.inner.jobs_succeeded.load(Ordering::Relaxed)
    }

    pub fn jobs_failed(&self) -> usize {
        self.inner.jobs_failed.load(Ordering::Relaxed)
    }

    pub fn attempts_started(&self) -> usize {
        self.inner.attempts_started.load(Ordering::Relaxed)
    }

    pub fn preemptions(&self) -> usize {
        self.inner.preemptions.load(Ordering::Relaxed)
    }

    pub fn engine_out_of_memory(&self) -> usize {
        self.inner.engine_out_of_memory.load(Ordering::Relaxed)
    }

    pub fn budget_shrinks(&self) -> usize {
        self.inner.budget_shrinks.load(Ordering::Relaxed)
    }

    pub fn floor_failures(&self) -> usize {
        self.inner.floor_failures.load(Ordering::Relaxed)
    }

    pub fn fast_path_moves(&self) -> usize {
        self.inner.fast_path_moves.load(Ordering::Relaxed)
    }

    /// Average wall time of successful jobs
    pub fn avg_duration_ms(&self) -> f64 {
        let total_ms = self.inner.total_duration_ms.load(Ordering::Relaxed) as f64;
        let jobs = self.jobs_succeeded() as f64;

        if jobs > 0.0 { total_ms / jobs } else { 0.0 }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            jobs_started: self.jobs_started(),
            jobs_succeeded: self.jobs_succeeded(),
            jobs_failed: self.jobs_failed(),
            attempts_started: self.attempts_started(),
            preemptions: self.preemptions(),
            engine_out_of_memory: self.engine_out_of_memory(),
            budget_shrinks: self.budget_shrinks(),
            floor_failures: self.floor_failures(),
            fast_path_moves: self.fast_path_moves(),
            avg_duration_ms: self.avg_duration_ms(),
        }
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub jobs_started: usize,
    pub jobs_succeeded: usize,
    pub jobs_failed: usize,
    pub attempts_started: usize,
    pub preemptions: usize,
    pub engine_out_of_memory: usize,
    pub budget_shrinks: usize,
    pub floor_failures: usize,
    pub fast_path_moves: usize,
    pub avg_duration_ms: f64,
}

impl MetricsSummary {
    pub fn log(&self) {
        log::info!("=== Rewrite Metrics Summary ===");
        log::info!(
            "Jobs: {} started, {} succeeded, {} failed, {} moved without rewrite",
            self.jobs_started,
            self.jobs_succeeded,
            self.jobs_failed,
            self.fast_path_moves
        );
        log::info!(
            "Attempts: {} started, {} preempted, {} engine out-of-memory, {} budget shrinks, {} floor failures",
            self.attempts_started,
            self.preemptions,
            self.engine_out_of_memory,
            self.budget_shrinks,
            self.floor_failures
        );
        log::info!("Average job duration: {:.2}ms", self.avg_duration_ms);
    }
}
