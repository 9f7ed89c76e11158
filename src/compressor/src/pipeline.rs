//! Public entry points: compress, re-sort, compress an arbitrary query
//!
//! Validates the caller's paths, takes the empty-input shortcut, and wires
//! metadata translation, query building and the adaptive executor together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::config::{Configuration, OutputConfig};
use common::verbosity::Verbosity;

use crate::budget::ResourceBudget;
use crate::error::{CompressError, Result};
use crate::executor::{AdaptiveExecutor, ExecutorConfig};
use crate::job::RewriteJob;
use crate::launcher::ProcessLauncher;
use crate::memory::SystemMemoryProbe;
use crate::metadata::{FileMetadata, read_footer};
use crate::query::{RewriteQuery, SortKey};
use crate::worker::move_into_place;

/// One input file or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFiles {
    Single(PathBuf),
    Many(Vec<PathBuf>),
}

impl InputFiles {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            InputFiles::Single(path) => std::slice::from_ref(path),
            InputFiles::Many(paths) => paths,
        }
    }
}

impl From<PathBuf> for InputFiles {
    fn from(path: PathBuf) -> Self {
        InputFiles::Single(path)
    }
}

impl From<&Path> for InputFiles {
    fn from(path: &Path) -> Self {
        InputFiles::Single(path.to_path_buf())
    }
}

impl From<Vec<PathBuf>> for InputFiles {
    fn from(paths: Vec<PathBuf>) -> Self {
        InputFiles::Many(paths)
    }
}

/// Per-call settings shared by every entry point
#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub output: OutputConfig,
    /// Parent of the per-call scratch directory; created if missing
    pub working_directory: PathBuf,
    /// Footer metadata for the output; the first input's when `None`
    pub metadata: Option<FileMetadata>,
    pub verbosity: Verbosity,
    /// First attempt's budget; detected from the host when `None`
    pub initial_budget: Option<ResourceBudget>,
}

impl CompressOptions {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            output: config.output.clone(),
            working_directory: config.working_directory.clone(),
            metadata: None,
            verbosity: config.verbosity,
            initial_budget: None,
        }
    }

    pub fn with_metadata(mut self, metadata: FileMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_initial_budget(mut self, budget: ResourceBudget) -> Self {
        self.initial_budget = Some(budget);
        self
    }
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self::from_config(&Configuration::default())
    }
}

/// Where the output went and which budget produced it
#[derive(Debug, Clone, PartialEq)]
pub struct CompressOutcome {
    pub output: PathBuf,
    /// `None` when the input was moved without running the engine
    pub budget: Option<ResourceBudget>,
}

pub struct Pipeline {
    executor: AdaptiveExecutor,
}

impl Pipeline {
    pub fn new(executor: AdaptiveExecutor) -> Self {
        Self { executor }
    }

    /// Pipeline running attempts as worker processes of `launcher`
    pub fn with_launcher(launcher: ProcessLauncher, config: &Configuration) -> Self {
        let executor = AdaptiveExecutor::new(
            Arc::new(launcher),
            Arc::new(SystemMemoryProbe::new()),
            ExecutorConfig::from(&config.executor),
        );
        Self::new(executor)
    }

    /// Pipeline using the configured worker executable, or this binary
    pub fn from_config(config: &Configuration) -> Result<Self> {
        let launcher = match &config.executor.worker_executable {
            Some(path) => ProcessLauncher::new(path.clone()),
            None => ProcessLauncher::current_exe()?,
        };
        Ok(Self::with_launcher(launcher, config))
    }

    pub fn executor(&self) -> &AdaptiveExecutor {
        &self.executor
    }

    /// Re-encode `input` into `output` with the configured codec and row groups
    pub async fn compress(
        &self,
        input: impl Into<InputFiles>,
        output: &Path,
        options: &CompressOptions,
    ) -> Result<CompressOutcome> {
        self.rewrite_files(input.into(), output, None, options).await
    }

    /// Like [`Pipeline::compress`], with rows ordered by `order_by`
    pub async fn sort(
        &self,
        input: impl Into<InputFiles>,
        output: &Path,
        order_by: &[SortKey],
        options: &CompressOptions,
    ) -> Result<CompressOutcome> {
        if order_by.is_empty() {
            return Err(CompressError::Precondition(
                "sorting requires at least one sort key".to_string(),
            ));
        }
        self.rewrite_files(input.into(), output, Some(order_by), options)
            .await
    }

    /// Write the result of a prepared query with explicit footer metadata
    pub async fn compress_query(
        &self,
        query: RewriteQuery,
        output: &Path,
        metadata: &FileMetadata,
        options: &CompressOptions,
    ) -> Result<CompressOutcome> {
        let output = resolve_output(output)?;
        let mut sources = Vec::with_capacity(query.sources.len());
        for path in &query.sources {
            let source = resolve_input(path)?;
            check_distinct(&source, &output)?;
            sources.push(source);
        }
        prepare_working_directory(&options.working_directory)?;

        // the worker runs inside its attempt directory
        let query = RewriteQuery {
            sources,
            sql: query.sql,
        };
        let literal = metadata.to_kv_literal()?;
        self.execute(query, output, literal, options).await
    }

    async fn rewrite_files(
        &self,
        input: InputFiles,
        output: &Path,
        order_by: Option<&[SortKey]>,
        options: &CompressOptions,
    ) -> Result<CompressOutcome> {
        if input.paths().is_empty() {
            return Err(CompressError::Precondition(
                "no input files given".to_string(),
            ));
        }

        let output = resolve_output(output)?;
        let mut sources = Vec::with_capacity(input.paths().len());
        for path in input.paths() {
            let source = resolve_input(path)?;
            check_distinct(&source, &output)?;
            sources.push(source);
        }
        prepare_working_directory(&options.working_directory)?;

        let first_footer = match (&input, &options.metadata) {
            (InputFiles::Single(_), _) | (InputFiles::Many(_), None) => {
                Some(read_footer(&sources[0])?)
            }
            (InputFiles::Many(_), Some(_)) => None,
        };

        if let (InputFiles::Single(_), Some(footer)) = (&input, &first_footer) {
            if footer.num_rows == 0 {
                log::info!(
                    "{} has no rows, moving it to {} without rewriting",
                    sources[0].display(),
                    output.display()
                );
                move_into_place(&sources[0], &output)?;
                self.executor.metrics().record_fast_path();
                return Ok(CompressOutcome {
                    output,
                    budget: None,
                });
            }
        }

        let literal = match (&options.metadata, first_footer) {
            (Some(metadata), _) => metadata.to_kv_literal()?,
            (None, Some(footer)) => footer.metadata.to_kv_literal()?,
            (None, None) => FileMetadata::new().to_kv_literal()?,
        };

        let query = match order_by {
            Some(keys) => RewriteQuery::read_ordered(sources, keys)?,
            None => RewriteQuery::read(sources)?,
        };

        self.execute(query, output, literal, options).await
    }

    async fn execute(
        &self,
        query: RewriteQuery,
        output: PathBuf,
        metadata_literal: String,
        options: &CompressOptions,
    ) -> Result<CompressOutcome> {
        let call_dir = tempfile::Builder::new()
            .prefix("geoshrink-")
            .tempdir_in(&options.working_directory)
            .map_err(|e| {
                CompressError::io(
                    "Failed to create scratch directory",
                    &options.working_directory,
                    e,
                )
            })?;

        log::debug!("Rewrite query: {query}");
        let job = RewriteJob::new(query, output.clone(), metadata_literal, &options.output);

        let result = self
            .executor
            .run_with_adaptive_budget(
                &job,
                options.initial_budget,
                options.verbosity,
                call_dir.path(),
            )
            .await;

        let path = call_dir.path().to_path_buf();
        if let Err(e) = call_dir.close() {
            log::warn!("Failed to remove scratch directory {}: {e}", path.display());
        }

        let budget = result?;
        Ok(CompressOutcome {
            output,
            budget: Some(budget),
        })
    }
}

fn resolve_input(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|e| CompressError::io("Failed to resolve input", path, e))
}

/// Canonical parent joined with the file name; the output need not exist yet
fn resolve_output(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        CompressError::Precondition(format!("output {} is not a file path", path.display()))
    })?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let parent = parent.canonicalize().map_err(|e| {
        CompressError::Precondition(format!(
            "output directory {} is not accessible: {e}",
            parent.display()
        ))
    })?;

    let output = parent.join(file_name);
    // An existing output may be a symlink to one of the inputs
    Ok(output.canonicalize().unwrap_or(output))
}

fn check_distinct(input: &Path, output: &Path) -> Result<()> {
    if input == output {
        return Err(CompressError::Precondition(format!(
            "input and output are the same file: {}",
            output.display()
        )));
    }
    Ok(())
}

fn prepare_working_directory(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        CompressError::Precondition(format!(
            "working directory {} cannot be created: {e}",
            dir.display()
        ))
    })
}
