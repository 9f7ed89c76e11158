//! Isolated worker processes
//!
//! Every attempt runs in a fresh child process so that an exhausted or killed
//! attempt can never leave half-allocated state behind in the supervisor.

use std::io::Write;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use common::stderr::CountingStderr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};

use crate::error::{CompressError, Result};
use crate::job::{AttemptSpec, WorkerReport};

/// Subcommand of the geoshrink binary that runs one attempt
pub const WORKER_SUBCOMMAND: &str = "worker";

/// How an attempt ended on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptExit {
    Completed,
    /// The engine (or the kernel) reported an out-of-memory condition
    OutOfMemory(String),
    Failed(String),
}

/// Starts attempts
#[async_trait]
pub trait AttemptLauncher: Send + Sync {
    async fn launch(&self, spec: &AttemptSpec) -> Result<Box<dyn RunningAttempt>>;
}

/// Handle on an attempt in flight
#[async_trait]
pub trait RunningAttempt: Send {
    /// Non-blocking completion check
    fn try_exit(&mut self) -> Result<Option<AttemptExit>>;

    /// Force termination and reap the worker
    async fn kill(&mut self) -> Result<()>;
}

/// Launches `<executable> worker --spec <attempt.json>`
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    executable: PathBuf,
}

impl ProcessLauncher {
    pub fn new(executable: PathBuf) -> Self {
        Self { executable }
    }

    /// Re-invoke the running binary as the worker
    pub fn current_exe() -> Result<Self> {
        let executable = std::env::current_exe()
            .map_err(|e| CompressError::Worker(format!("cannot locate own executable: {e}")))?;
        Ok(Self::new(executable))
    }

    pub fn executable(&self) -> &PathBuf {
        &self.executable
    }
}

#[async_trait]
impl AttemptLauncher for ProcessLauncher {
    async fn launch(&self, spec: &AttemptSpec) -> Result<Box<dyn RunningAttempt>> {
        let spec_path = spec.spec_path();
        spec.write_to(&spec_path)?;

        let mut cmd = Command::new(&self.executable);
        cmd.arg(WORKER_SUBCOMMAND)
            .arg("--spec")
            .arg(&spec_path)
            .current_dir(&spec.scratch_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            CompressError::Worker(format!(
                "failed to spawn worker {}: {e}",
                self.executable.display()
            ))
        })?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }

        log::debug!(
            "Spawned worker pid={:?} with budget {}",
            child.id(),
            spec.budget
        );

        Ok(Box::new(WorkerProcess {
            child,
            report_path: spec.report_path(),
        }))
    }
}

struct WorkerProcess {
    child: Child,
    report_path: PathBuf,
}

#[async_trait]
impl RunningAttempt for WorkerProcess {
    fn try_exit(&mut self) -> Result<Option<AttemptExit>> {
        let status = self
            .child
            .try_wait()
            .map_err(|e| CompressError::Worker(format!("failed to poll worker: {e}")))?;

        match status {
            None => Ok(None),
            Some(status) => {
                let report = WorkerReport::read_from(&self.report_path)?;
                Ok(Some(classify_exit(status, report)))
            }
        }
    }

    async fn kill(&mut self) -> Result<()> {
        self.child
            .kill()
            .await
            .map_err(|e| CompressError::Worker(format!("failed to kill worker: {e}")))
    }
}

/// Copy the worker's stderr line by line onto ours, keeping the line count
async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let _ = writeln!(CountingStderr, "{line}");
            }
            Ok(None) => break,
            Err(e) => {
                log::debug!("Stopped forwarding worker output: {e}");
                break;
            }
        }
    }
}

/// Turn a worker's exit status and optional report into an [`AttemptExit`]
fn classify_exit(status: ExitStatus, report: Option<WorkerReport>) -> AttemptExit {
    match report {
        Some(WorkerReport::Completed) if status.success() => AttemptExit::Completed,
        Some(WorkerReport::Completed) => {
            AttemptExit::Failed(format!("worker reported success but exited with {status}"))
        }
        Some(WorkerReport::OutOfMemory { message }) => AttemptExit::OutOfMemory(message),
        Some(WorkerReport::Failed { message }) => AttemptExit::Failed(message),
        None if killed_by_sigkill(&status) => AttemptExit::OutOfMemory(format!(
            "worker was killed ({status}), most likely by the host's out-of-memory killer"
        )),
        None => AttemptExit::Failed(format!("worker exited with {status} without a report")),
    }
}

#[cfg(unix)]
fn killed_by_sigkill(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(9)
}

#[cfg(not(unix))]
fn killed_by_sigkill(_status: &ExitStatus) -> bool {
    false
}
