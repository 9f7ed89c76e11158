//! Worker side of an attempt
//!
//! Runs inside the child process spawned by [`crate::launcher::ProcessLauncher`]:
//! reads the attempt spec, executes the rewrite with DataFusion under the
//! attempt's memory and thread ceiling, and records the outcome as a report.

use std::path::{Path, PathBuf};

use datafusion::config::TableParquetOptions;
use datafusion::error::{DataFusionError, Result as DataFusionResult};
use datafusion::execution::disk_manager::DiskManagerConfig;
use datafusion::execution::runtime_env::RuntimeEnvBuilder;
use datafusion::parquet::arrow::AsyncArrowWriter;
use datafusion::parquet::arrow::arrow_writer::ArrowWriterOptions;
use datafusion::parquet::file::properties::{WriterProperties, WriterPropertiesBuilder};
use datafusion::parquet::format::KeyValue;
use datafusion::prelude::*;
use futures::StreamExt;

use crate::error::{CompressError, Result};
use crate::job::{AttemptSpec, RewriteJob, WorkerReport};
use crate::metadata::parse_kv_literal;
use crate::query::SOURCE_VIEW;

/// Engine output inside the attempt directory, moved into place on success
pub const STAGED_FILE: &str = "staged.parquet";

/// Run the attempt described at `spec_path` and return the process exit code.
///
/// The report is written before returning. Without a readable spec there is
/// no scratch directory to report into, so that case only logs and exits 1.
pub fn run_worker(spec_path: &Path) -> u8 {
    let spec = match AttemptSpec::read_from(spec_path) {
        Ok(spec) => spec,
        Err(e) => {
            log::error!("Worker cannot start: {e}");
            return 1;
        }
    };

    let report = match build_runtime(spec.budget.thread_limit) {
        Ok(runtime) => runtime.block_on(execute_attempt(&spec)),
        Err(e) => WorkerReport::Failed {
            message: format!("failed to start worker runtime: {e}"),
        },
    };

    if let Err(e) = report.write_to(&spec.report_path()) {
        log::error!("Worker failed to record its outcome: {e}");
        return 1;
    }

    report.exit_code()
}

fn build_runtime(threads: usize) -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads.max(1))
        .enable_all()
        .build()
}

/// Execute one attempt and classify its outcome
pub async fn execute_attempt(spec: &AttemptSpec) -> WorkerReport {
    let staged = spec.scratch_dir.join(STAGED_FILE);

    log::debug!(
        "Worker rewriting {} source file(s) with budget {}",
        spec.job.query.sources.len(),
        spec.budget
    );

    if let Err(e) = rewrite(spec, &staged).await {
        return classify_engine_error(e);
    }

    match move_into_place(&staged, &spec.job.output_path) {
        Ok(()) => WorkerReport::Completed,
        Err(e) => WorkerReport::Failed {
            message: e.to_string(),
        },
    }
}

async fn rewrite(spec: &AttemptSpec, staged: &Path) -> DataFusionResult<()> {
    let runtime = RuntimeEnvBuilder::new()
        .with_memory_limit(spec.budget.memory_limit_bytes(), 1.0)
        .with_disk_manager(DiskManagerConfig::NewSpecified(vec![
            spec.scratch_dir.clone(),
        ]))
        .build_arc()?;

    let config = SessionConfig::new().with_target_partitions(spec.budget.thread_limit);
    let ctx = SessionContext::new_with_config_rt(config, runtime);

    let sources: Vec<String> = spec
        .job
        .query
        .sources
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();

    // Explicit file list, no extension filter and no partition columns
    let source = ctx
        .read_parquet(sources, ParquetReadOptions::default().file_extension(""))
        .await?;
    ctx.register_table(SOURCE_VIEW, source.into_view())?;

    let df = ctx.sql(&spec.job.query.sql).await?;
    let mut stream = df.execute_stream().await?;

    // The footer carries only the caller's key/value block
    let options = ArrowWriterOptions::new()
        .with_properties(writer_properties(&spec.job)?)
        .with_skip_arrow_metadata(true);
    let file = tokio::fs::File::create(staged).await?;
    let mut writer = AsyncArrowWriter::try_new_with_options(file, stream.schema(), options)?;

    while let Some(batch) = stream.next().await {
        writer.write(&batch?).await?;
    }
    writer.close().await?;

    Ok(())
}

/// Parquet writer settings for the job's codec, row groups and footer metadata.
///
/// Footer pairs keep their order and duplicates.
fn writer_properties(job: &RewriteJob) -> DataFusionResult<WriterProperties> {
    let pairs = parse_kv_literal(&job.metadata_literal)
        .map_err(|e| DataFusionError::External(Box::new(e)))?;

    let mut options = TableParquetOptions::default();
    options.global.compression = Some(job.codec.engine_option(job.codec_level));
    options.global.max_row_group_size = job.row_group_size;
    options.global.skip_arrow_metadata = true;

    let key_value_metadata = pairs
        .into_iter()
        .map(|(key, value)| KeyValue::new(key, value))
        .collect();

    Ok(WriterPropertiesBuilder::try_from(&options)?
        .set_key_value_metadata(Some(key_value_metadata))
        .build())
}

fn classify_engine_error(err: DataFusionError) -> WorkerReport {
    let message = err.to_string();
    let exhausted = matches!(err.find_root(), DataFusionError::ResourcesExhausted(_))
        // errors crossing the parquet writer arrive as text
        || message.contains("Resources exhausted");

    if exhausted {
        log::warn!("Worker ran out of memory: {message}");
        WorkerReport::OutOfMemory { message }
    } else {
        log::error!("Worker failed: {message}");
        WorkerReport::Failed { message }
    }
}

/// Move the staged file to `output`, never exposing a partial file there
pub(crate) fn move_into_place(staged: &Path, output: &Path) -> Result<()> {
    if std::fs::rename(staged, output).is_ok() {
        return Ok(());
    }

    // Different filesystem: copy next to the target, then rename
    let partial = partial_path(output);
    std::fs::copy(staged, &partial)
        .map_err(|e| CompressError::io("Failed to copy output", &partial, e))?;
    std::fs::rename(&partial, output).map_err(|e| {
        let _ = std::fs::remove_file(&partial);
        CompressError::io("Failed to move output into place", output, e)
    })?;

    if let Err(e) = std::fs::remove_file(staged) {
        log::debug!("Failed to remove staged file {}: {e}", staged.display());
    }
    Ok(())
}

fn partial_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{name}.partial"))
}
