//! Resource-adaptive execution of rewrite jobs
//!
//! Runs a job in an isolated worker under an explicit memory and thread
//! budget, watches host memory while it runs, and retries with a halved
//! budget whenever the attempt runs out of memory. Attempts are strictly
//! sequential: at most one memory-heavy worker exists at any time.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::config::ExecutorSettings;
use common::verbosity::Verbosity;
use tokio::time::MissedTickBehavior;

use crate::budget::ResourceBudget;
use crate::error::{CompressError, Result};
use crate::job::{AttemptSpec, RewriteJob};
use crate::launcher::{AttemptExit, AttemptLauncher, RunningAttempt};
use crate::memory::{MemoryProbe, PressurePolicy};
use crate::metrics::ExecutorMetrics;
use crate::notice::{NoticeSink, StderrNotices};

/// Configuration for adaptive execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Interval between memory samples while an attempt runs
    pub poll_interval: Duration,
    pub pressure: PressurePolicy,
    /// Initial memory budget when the caller passes none; host total otherwise
    pub memory_limit_gb: Option<f64>,
    /// Initial thread budget when the caller passes none; all cores otherwise
    pub thread_limit: Option<usize>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::from(&ExecutorSettings::default())
    }
}

impl From<&ExecutorSettings> for ExecutorConfig {
    fn from(settings: &ExecutorSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval,
            pressure: PressurePolicy::from(settings),
            memory_limit_gb: settings.memory_limit_gb,
            thread_limit: settings.thread_limit,
        }
    }
}

/// Result of one attempt as seen by the retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttemptOutcome {
    Completed,
    /// Engine-reported out-of-memory or supervisor preemption
    ResourceExhausted { reason: String, preempted: bool },
    Failed(String),
}

impl From<AttemptExit> for AttemptOutcome {
    fn from(exit: AttemptExit) -> Self {
        match exit {
            AttemptExit::Completed => AttemptOutcome::Completed,
            AttemptExit::OutOfMemory(reason) => AttemptOutcome::ResourceExhausted {
                reason,
                preempted: false,
            },
            AttemptExit::Failed(message) => AttemptOutcome::Failed(message),
        }
    }
}

/// Runs rewrite jobs under a shrinking resource budget
pub struct AdaptiveExecutor {
    launcher: Arc<dyn AttemptLauncher>,
    probe: Arc<dyn MemoryProbe>,
    notices: Arc<dyn NoticeSink>,
    metrics: ExecutorMetrics,
    config: ExecutorConfig,
}

impl AdaptiveExecutor {
    pub fn new(
        launcher: Arc<dyn AttemptLauncher>,
        probe: Arc<dyn MemoryProbe>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            launcher,
            probe,
            notices: Arc::new(StderrNotices::new()),
            metrics: ExecutorMetrics::new(),
            config,
        }
    }

    pub fn with_notices(mut self, notices: Arc<dyn NoticeSink>) -> Self {
        self.notices = notices;
        self
    }

    pub fn with_metrics(mut self, metrics: ExecutorMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &ExecutorMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Budget of the first attempt: caller's, then configured, then the whole host
    pub fn initial_budget(&self, requested: Option<ResourceBudget>) -> ResourceBudget {
        if let Some(budget) = requested {
            return budget;
        }

        let host = match (self.config.memory_limit_gb, self.config.thread_limit) {
            (Some(memory), Some(threads)) => return ResourceBudget::new(memory, threads),
            _ => ResourceBudget::for_host(self.probe.sample().total_bytes, available_threads()),
        };

        ResourceBudget::new(
            self.config.memory_limit_gb.unwrap_or(host.memory_limit_gb),
            self.config.thread_limit.unwrap_or(host.thread_limit),
        )
    }

    /// Run `job` until it fits into a budget or the budget floor is reached.
    ///
    /// Every attempt gets a fresh worker and a fresh scratch directory under
    /// `scratch_root`; the directory is gone before the next attempt starts.
    /// Returns the budget of the successful attempt.
    pub async fn run_with_adaptive_budget(
        &self,
        job: &RewriteJob,
        initial: Option<ResourceBudget>,
        verbosity: Verbosity,
        scratch_root: &Path,
    ) -> Result<ResourceBudget> {
        let mut budget = self.initial_budget(initial);
        let started = Instant::now();
        self.metrics.record_job_start();

        log::info!(
            "Running rewrite to {} with initial budget {}",
            job.output_path.display(),
            budget
        );

        loop {
            let outcome = match self.run_attempt(job, budget, scratch_root).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.metrics.record_job_failure();
                    return Err(e);
                }
            };

            match outcome {
                AttemptOutcome::Completed => {
                    let duration = started.elapsed();
                    self.metrics.record_job_success(duration);
                    if !verbosity.is_silent() && !verbosity.keeps_output() {
                        self.notices.clear();
                    }

                    log::info!(
                        "Rewrite to {} completed with budget {} in {:?}",
                        job.output_path.display(),
                        budget,
                        duration
                    );
                    return Ok(budget);
                }
                AttemptOutcome::Failed(message) => {
                    self.metrics.record_job_failure();
                    log::error!("Rewrite attempt failed: {message}");
                    return Err(CompressError::Engine(message));
                }
                AttemptOutcome::ResourceExhausted { reason, preempted } => {
                    if preempted {
                        self.metrics.record_preemption();
                    } else {
                        self.metrics.record_engine_out_of_memory();
                    }

                    let Some(next) = budget.shrink() else {
                        self.metrics.record_floor_failure();
                        self.metrics.record_job_failure();
                        log::error!(
                            "Rewrite ran out of memory at the smallest budget ({budget}): {reason}"
                        );
                        return Err(CompressError::BudgetFloor {
                            last_budget: budget,
                        });
                    };

                    self.metrics.record_shrink();
                    log::warn!("Attempt with budget {budget} ran out of memory: {reason}");

                    if !verbosity.is_silent() {
                        let cause = if preempted {
                            "host memory pressure"
                        } else {
                            "an out-of-memory error"
                        };
                        self.notices.notice(&format!(
                            "Encountered {cause} during operation. \
                             Retrying with lower number of resources ({next})."
                        ));
                    }

                    budget = next;
                }
            }
        }
    }

    async fn run_attempt(
        &self,
        job: &RewriteJob,
        budget: ResourceBudget,
        scratch_root: &Path,
    ) -> Result<AttemptOutcome> {
        let attempt_dir = tempfile::Builder::new()
            .prefix("attempt-")
            .tempdir_in(scratch_root)
            .map_err(|e| {
                CompressError::io("Failed to create attempt directory", scratch_root, e)
            })?;

        self.metrics.record_attempt();
        log::debug!(
            "Starting attempt with budget {} in {}",
            budget,
            attempt_dir.path().display()
        );

        let spec = AttemptSpec {
            job: job.clone(),
            budget,
            scratch_dir: attempt_dir.path().to_path_buf(),
        };

        let mut attempt = self.launcher.launch(&spec).await?;
        let outcome = self.supervise(attempt.as_mut()).await;
        drop(attempt);

        let path = attempt_dir.path().to_path_buf();
        if let Err(e) = attempt_dir.close() {
            log::warn!(
                "Failed to remove attempt directory {}: {e}",
                path.display()
            );
        }

        outcome
    }

    /// Wait for the attempt, preempting it when host memory crosses the threshold
    async fn supervise(&self, attempt: &mut dyn RunningAttempt) -> Result<AttemptOutcome> {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Some(exit) = attempt.try_exit()? {
                return Ok(exit.into());
            }

            let sample = self.probe.sample();
            if self.config.pressure.is_exceeded(&sample) {
                let threshold = self.config.pressure.threshold_percent(sample.total_bytes);
                log::warn!(
                    "Host memory use {:.1}% exceeds {:.1}%, preempting attempt",
                    sample.used_percent,
                    threshold
                );
                attempt.kill().await?;

                return Ok(AttemptOutcome::ResourceExhausted {
                    reason: format!(
                        "host memory use {:.1}% exceeded {:.1}%",
                        sample.used_percent, threshold
                    ),
                    preempted: true,
                });
            }
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySample;
    use crate::notice::CollectedNotices;
    use crate::query::RewriteQuery;
    use async_trait::async_trait;
    use common::config::{MEMORY_1GB, OutputConfig};
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Scripted behaviour of one fake attempt
    #[derive(Debug, Clone)]
    enum Behavior {
        /// Finish after the given number of polls
        Complete(usize),
        OutOfMemory,
        Fail(&'static str),
        /// Never finish on its own
        Hang,
    }

    #[derive(Default)]
    struct FakeLauncher {
        script: Mutex<VecDeque<Behavior>>,
        launched: Mutex<Vec<AttemptSpec>>,
    }

    impl FakeLauncher {
        fn new(script: Vec<Behavior>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                launched: Mutex::new(Vec::new()),
            })
        }

        fn budgets(&self) -> Vec<ResourceBudget> {
            self.launched
                .lock()
                .unwrap()
                .iter()
                .map(|spec| spec.budget)
                .collect()
        }

        fn scratch_dirs(&self) -> Vec<PathBuf> {
            self.launched
                .lock()
                .unwrap()
                .iter()
                .map(|spec| spec.scratch_dir.clone())
                .collect()
        }
    }

    struct FakeAttempt {
        behavior: Behavior,
        polls: usize,
        killed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl AttemptLauncher for FakeLauncher {
        async fn launch(&self, spec: &AttemptSpec) -> Result<Box<dyn RunningAttempt>> {
            assert!(spec.scratch_dir.is_dir(), "scratch dir must exist at launch");
            self.launched.lock().unwrap().push(spec.clone());
            let behavior = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Behavior::Hang);

            Ok(Box::new(FakeAttempt {
                behavior,
                polls: 0,
                killed: Arc::new(AtomicBool::new(false)),
            }))
        }
    }

    #[async_trait]
    impl RunningAttempt for FakeAttempt {
        fn try_exit(&mut self) -> Result<Option<AttemptExit>> {
            assert!(!self.killed.load(Ordering::SeqCst));
            self.polls += 1;
            Ok(match &self.behavior {
                Behavior::Complete(after) if self.polls > *after => Some(AttemptExit::Completed),
                Behavior::Complete(_) | Behavior::Hang => None,
                Behavior::OutOfMemory => Some(AttemptExit::OutOfMemory("pool exhausted".into())),
                Behavior::Fail(message) => Some(AttemptExit::Failed(message.to_string())),
            })
        }

        async fn kill(&mut self) -> Result<()> {
            self.killed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FixedProbe(MemorySample);

    impl MemoryProbe for FixedProbe {
        fn sample(&self) -> MemorySample {
            self.0
        }
    }

    fn probe(total_gb: u64, used_percent: f64) -> Arc<dyn MemoryProbe> {
        Arc::new(FixedProbe(MemorySample {
            used_percent,
            total_bytes: total_gb * MEMORY_1GB,
        }))
    }

    fn test_config() -> ExecutorConfig {
        ExecutorConfig {
            poll_interval: Duration::from_millis(1),
            thread_limit: Some(8),
            ..Default::default()
        }
    }

    fn job() -> RewriteJob {
        RewriteJob::new(
            RewriteQuery::read(vec![PathBuf::from("/in.parquet")]).unwrap(),
            PathBuf::from("/out.parquet"),
            "{  }".to_string(),
            &OutputConfig::default(),
        )
    }

    fn assert_empty(dir: &Path) {
        let leftovers: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
        assert!(leftovers.is_empty(), "scratch root not empty: {leftovers:?}");
    }

    #[tokio::test]
    async fn test_first_attempt_succeeds_with_host_budget() {
        let scratch = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(vec![Behavior::Complete(2)]);
        let executor = AdaptiveExecutor::new(launcher.clone(), probe(8, 40.0), test_config());

        let budget = executor
            .run_with_adaptive_budget(&job(), None, Verbosity::Silent, scratch.path())
            .await
            .unwrap();

        assert_eq!(budget, ResourceBudget::new(8.0, 8));
        assert_eq!(launcher.budgets(), vec![ResourceBudget::new(8.0, 8)]);
        assert_eq!(executor.metrics().jobs_succeeded(), 1);
        assert_empty(scratch.path());
    }

    #[tokio::test]
    async fn test_engine_out_of_memory_shrinks_budget() {
        let scratch = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(vec![
            Behavior::OutOfMemory,
            Behavior::OutOfMemory,
            Behavior::Complete(0),
        ]);
        let notices = Arc::new(CollectedNotices::new());
        let executor = AdaptiveExecutor::new(launcher.clone(), probe(8, 40.0), test_config())
            .with_notices(notices.clone());

        let budget = executor
            .run_with_adaptive_budget(
                &job(),
                Some(ResourceBudget::new(4.0, 6)),
                Verbosity::Verbose,
                scratch.path(),
            )
            .await
            .unwrap();

        assert_eq!(budget, ResourceBudget::new(1.0, 2));
        assert_eq!(
            launcher.budgets(),
            vec![
                ResourceBudget::new(4.0, 6),
                ResourceBudget::new(2.0, 3),
                ResourceBudget::new(1.0, 2),
            ]
        );
        assert_eq!(
            notices.lines(),
            vec![
                "Encountered an out-of-memory error during operation. \
                 Retrying with lower number of resources (2.00GB, 3 threads)."
                    .to_string(),
                "Encountered an out-of-memory error during operation. \
                 Retrying with lower number of resources (1.00GB, 2 threads)."
                    .to_string(),
            ]
        );
        assert!(!notices.was_cleared());
        assert_eq!(executor.metrics().engine_out_of_memory(), 2);
        assert_eq!(executor.metrics().budget_shrinks(), 2);
        assert_empty(scratch.path());
    }

    #[tokio::test]
    async fn test_silent_mode_emits_no_notices() {
        let scratch = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(vec![Behavior::OutOfMemory, Behavior::Complete(0)]);
        let notices = Arc::new(CollectedNotices::new());
        let executor = AdaptiveExecutor::new(launcher, probe(8, 40.0), test_config())
            .with_notices(notices.clone());

        executor
            .run_with_adaptive_budget(&job(), None, Verbosity::Silent, scratch.path())
            .await
            .unwrap();

        assert!(notices.lines().is_empty());
        assert!(!notices.was_cleared());
    }

    #[tokio::test]
    async fn test_transient_mode_clears_notices_on_success() {
        let scratch = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(vec![Behavior::OutOfMemory, Behavior::Complete(0)]);
        let notices = Arc::new(CollectedNotices::new());
        let executor = AdaptiveExecutor::new(launcher, probe(8, 40.0), test_config())
            .with_notices(notices.clone());

        executor
            .run_with_adaptive_budget(&job(), None, Verbosity::Transient, scratch.path())
            .await
            .unwrap();

        assert_eq!(notices.lines().len(), 1);
        assert!(notices.was_cleared());
    }

    #[tokio::test]
    async fn test_engine_failure_is_not_retried() {
        let scratch = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(vec![Behavior::Fail("column not found")]);
        let executor = AdaptiveExecutor::new(launcher.clone(), probe(8, 40.0), test_config());

        let err = executor
            .run_with_adaptive_budget(&job(), None, Verbosity::Verbose, scratch.path())
            .await
            .unwrap_err();

        assert!(matches!(err, CompressError::Engine(ref m) if m == "column not found"));
        assert_eq!(launcher.budgets().len(), 1);
        assert_eq!(executor.metrics().jobs_failed(), 1);
        assert_empty(scratch.path());
    }

    #[tokio::test]
    async fn test_preemption_on_eight_gigabyte_host_reaches_floor() {
        let scratch = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(vec![]);
        let notices = Arc::new(CollectedNotices::new());
        let executor = AdaptiveExecutor::new(launcher.clone(), probe(8, 99.0), test_config())
            .with_notices(notices.clone());

        let err = executor
            .run_with_adaptive_budget(&job(), None, Verbosity::Verbose, scratch.path())
            .await
            .unwrap_err();

        let memory: Vec<f64> = launcher
            .budgets()
            .iter()
            .map(|b| b.memory_limit_gb)
            .collect();
        let threads: Vec<usize> = launcher.budgets().iter().map(|b| b.thread_limit).collect();

        assert_eq!(memory, vec![8.0, 4.0, 2.0, 1.0, 0.5]);
        assert_eq!(threads, vec![8, 4, 2, 1, 1]);
        match err {
            CompressError::BudgetFloor { last_budget } => {
                assert_eq!(last_budget, ResourceBudget::new(0.5, 1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(notices.lines().len(), 4);
        assert!(notices.lines()[0].starts_with("Encountered host memory pressure"));
        assert_eq!(executor.metrics().preemptions(), 5);
        assert_eq!(executor.metrics().floor_failures(), 1);

        for dir in launcher.scratch_dirs() {
            assert!(!dir.exists(), "attempt dir {} survived", dir.display());
        }
        assert_empty(scratch.path());
    }

    #[tokio::test]
    async fn test_floor_error_surfaces_in_silent_mode() {
        let scratch = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(vec![Behavior::OutOfMemory, Behavior::OutOfMemory]);
        let notices = Arc::new(CollectedNotices::new());
        let executor = AdaptiveExecutor::new(launcher, probe(8, 40.0), test_config())
            .with_notices(notices.clone());

        let err = executor
            .run_with_adaptive_budget(
                &job(),
                Some(ResourceBudget::new(1.0, 1)),
                Verbosity::Silent,
                scratch.path(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CompressError::BudgetFloor { .. }));
        assert!(notices.lines().is_empty());
    }

    #[tokio::test]
    async fn test_large_host_preempts_only_above_headroom_threshold() {
        let scratch = tempfile::tempdir().unwrap();
        // 97% on a 64 GiB host is below the 98.4% threshold: no preemption
        let launcher = FakeLauncher::new(vec![Behavior::Complete(5)]);
        let executor = AdaptiveExecutor::new(launcher.clone(), probe(64, 97.0), test_config());

        executor
            .run_with_adaptive_budget(&job(), None, Verbosity::Silent, scratch.path())
            .await
            .unwrap();

        assert_eq!(launcher.budgets().len(), 1);
        assert_eq!(executor.metrics().preemptions(), 0);
    }

    #[tokio::test]
    async fn test_non_finite_budget_fails_after_one_attempt() {
        let scratch = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(vec![Behavior::OutOfMemory]);
        let executor = AdaptiveExecutor::new(launcher.clone(), probe(8, 40.0), test_config());

        let err = executor
            .run_with_adaptive_budget(
                &job(),
                Some(ResourceBudget::new(f64::NAN, 2)),
                Verbosity::Silent,
                scratch.path(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CompressError::BudgetFloor { .. }));
        assert_eq!(launcher.budgets().len(), 1);
    }

    /// Memory pressure that appears once the running worker wrote its pid
    #[cfg(unix)]
    struct PressureOnceStarted {
        scratch_root: PathBuf,
    }

    #[cfg(unix)]
    impl MemoryProbe for PressureOnceStarted {
        fn sample(&self) -> MemorySample {
            let started = std::fs::read_dir(&self.scratch_root)
                .map(|entries| {
                    entries
                        .flatten()
                        .any(|entry| entry.path().join("pid").exists())
                })
                .unwrap_or(false);

            MemorySample {
                used_percent: if started { 99.0 } else { 10.0 },
                total_bytes: 8 * MEMORY_1GB,
            }
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_worker_process_is_killed_and_reaped_under_pressure() {
        use crate::launcher::ProcessLauncher;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        let pids = dir.path().join("pids");

        // stands in for the worker: records its pid, then sleeps until killed
        let worker = dir.path().join("worker.sh");
        std::fs::write(
            &worker,
            format!(
                "#!/bin/sh\necho $$ >> '{}'\necho $$ > pid\nexec sleep 30\n",
                pids.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&worker, std::fs::Permissions::from_mode(0o755)).unwrap();

        let executor = AdaptiveExecutor::new(
            Arc::new(ProcessLauncher::new(worker)),
            Arc::new(PressureOnceStarted {
                scratch_root: scratch.clone(),
            }),
            test_config(),
        );

        let started = Instant::now();
        let err = executor
            .run_with_adaptive_budget(
                &job(),
                Some(ResourceBudget::new(1.0, 2)),
                Verbosity::Silent,
                &scratch,
            )
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(20));
        match err {
            CompressError::BudgetFloor { last_budget } => {
                assert_eq!(last_budget, ResourceBudget::new(0.5, 1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(executor.metrics().attempts_started(), 2);
        assert_eq!(executor.metrics().preemptions(), 2);
        assert_eq!(executor.metrics().budget_shrinks(), 1);
        assert_empty(&scratch);

        let pids = std::fs::read_to_string(&pids).unwrap();
        let pids: Vec<&str> = pids.lines().collect();
        assert_eq!(pids.len(), 2);
        for pid in pids {
            // a reaped child no longer exists, not even as a zombie
            let alive = std::process::Command::new("kill")
                .args(["-0", pid])
                .stderr(std::process::Stdio::null())
                .status()
                .unwrap()
                .success();
            assert!(!alive, "worker {pid} survived preemption");
        }
    }

    #[test]
    fn test_initial_budget_resolution() {
        let launcher = FakeLauncher::new(vec![]);
        let executor = AdaptiveExecutor::new(
            launcher,
            probe(16, 10.0),
            ExecutorConfig {
                memory_limit_gb: None,
                thread_limit: Some(3),
                ..Default::default()
            },
        );

        assert_eq!(executor.initial_budget(None), ResourceBudget::new(16.0, 3));
        assert_eq!(
            executor.initial_budget(Some(ResourceBudget::new(2.0, 2))),
            ResourceBudget::new(2.0, 2)
        );
    }

    #[test]
    fn test_executor_config_from_settings() {
        let settings = ExecutorSettings {
            poll_interval: Duration::from_millis(100),
            memory_limit_gb: Some(12.0),
            ..Default::default()
        };
        let config = ExecutorConfig::from(&settings);

        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.memory_limit_gb, Some(12.0));
        assert_eq!(config.pressure, PressurePolicy::default());
    }
}
