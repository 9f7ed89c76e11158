//! What an attempt runs and what it reports back

use std::path::{Path, PathBuf};

use common::config::{OutputConfig, ParquetCodec};
use serde::{Deserialize, Serialize};

use crate::budget::ResourceBudget;
use crate::error::{CompressError, Result};
use crate::query::RewriteQuery;

/// File written by the parent into the attempt directory
pub const SPEC_FILE: &str = "attempt.json";
/// File written by the worker into the attempt directory when it finishes
pub const REPORT_FILE: &str = "report.json";

/// One rewrite request: read `query`, write `output_path` with these
/// encoding parameters and this footer metadata literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteJob {
    pub query: RewriteQuery,
    pub output_path: PathBuf,
    pub metadata_literal: String,
    pub codec: ParquetCodec,
    pub codec_level: i32,
    pub row_group_size: usize,
}

impl RewriteJob {
    pub fn new(
        query: RewriteQuery,
        output_path: PathBuf,
        metadata_literal: String,
        output: &OutputConfig,
    ) -> Self {
        Self {
            query,
            output_path,
            metadata_literal,
            codec: output.codec,
            codec_level: output.codec_level,
            row_group_size: output.row_group_size,
        }
    }
}

/// Everything a worker process needs for a single attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSpec {
    pub job: RewriteJob,
    pub budget: ResourceBudget,
    /// Exclusive scratch directory, removed by the parent after the attempt
    pub scratch_dir: PathBuf,
}

impl AttemptSpec {
    pub fn spec_path(&self) -> PathBuf {
        self.scratch_dir.join(SPEC_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.scratch_dir.join(REPORT_FILE)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| CompressError::Worker(format!("failed to encode attempt: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| CompressError::io("Failed to write attempt spec", path, e))
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| CompressError::io("Failed to read attempt spec", path, e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CompressError::Worker(format!("malformed attempt spec: {e}")))
    }
}

/// Final status of a worker, persisted as [`REPORT_FILE`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerReport {
    Completed,
    OutOfMemory { message: String },
    Failed { message: String },
}

impl WorkerReport {
    /// Process exit code matching the report
    pub fn exit_code(&self) -> u8 {
        match self {
            WorkerReport::Completed => 0,
            WorkerReport::Failed { .. } => 1,
            WorkerReport::OutOfMemory { .. } => 3,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(self)
            .map_err(|e| CompressError::Worker(format!("failed to encode report: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| CompressError::io("Failed to write worker report", path, e))
    }

    /// Read a report; `None` when the worker never wrote one
    pub fn read_from(path: &Path) -> Result<Option<Self>> {
        match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| CompressError::Worker(format!("malformed worker report: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CompressError::io("Failed to read worker report", path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_wire_format() {
        let json = serde_json::to_string(&WorkerReport::OutOfMemory {
            message: "pool exhausted".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"out_of_memory","message":"pool exhausted"}"#);

        let completed: WorkerReport = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert_eq!(completed, WorkerReport::Completed);
        assert_eq!(completed.exit_code(), 0);
    }

    #[test]
    fn test_missing_report_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let report = WorkerReport::read_from(&dir.path().join(REPORT_FILE)).unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn test_attempt_spec_survives_the_handoff() {
        let dir = tempfile::tempdir().unwrap();
        let spec = AttemptSpec {
            job: RewriteJob::new(
                RewriteQuery::read(vec![PathBuf::from("/data/in.parquet")]).unwrap(),
                PathBuf::from("/data/out.parquet"),
                "{ 'geo': '{}' }".to_string(),
                &OutputConfig::default(),
            ),
            budget: ResourceBudget::new(4.0, 2),
            scratch_dir: dir.path().to_path_buf(),
        };

        spec.write_to(&spec.spec_path()).unwrap();
        let read = AttemptSpec::read_from(&spec.spec_path()).unwrap();

        assert_eq!(read, spec);
    }
}
