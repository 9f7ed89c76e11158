//! Rewrites GeoParquet files under a memory ceiling
//!
//! Each rewrite runs in an isolated worker process with an explicit memory
//! and thread budget. The [`AdaptiveExecutor`] supervises host memory while
//! the worker runs and retries with a halved budget whenever an attempt runs
//! out of memory, until the job fits or the budget floor is reached.

pub mod budget;
pub mod error;
pub mod executor;
pub mod job;
pub mod launcher;
pub mod memory;
pub mod metadata;
pub mod metrics;
pub mod notice;
pub mod pipeline;
pub mod query;
pub mod worker;

pub use budget::ResourceBudget;
pub use error::{CompressError, Result};
pub use executor::{AdaptiveExecutor, ExecutorConfig};
pub use launcher::{AttemptLauncher, ProcessLauncher, RunningAttempt, WORKER_SUBCOMMAND};
pub use memory::{MemoryProbe, MemorySample, PressurePolicy, SystemMemoryProbe};
pub use metadata::{FileMetadata, read_footer};
pub use metrics::ExecutorMetrics;
pub use pipeline::{CompressOptions, CompressOutcome, InputFiles, Pipeline};
pub use query::{RewriteQuery, SortKey};
pub use worker::run_worker;
