use std::path::PathBuf;
use std::string::FromUtf8Error;

use datafusion::parquet::errors::ParquetError;
use thiserror::Error;

use crate::budget::ResourceBudget;

/// Which half of a key/value pair failed to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataPart {
    Key,
    Value,
}

impl std::fmt::Display for MetadataPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataPart::Key => write!(f, "key"),
            MetadataPart::Value => write!(f, "value"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompressError {
    /// The caller asked for something that can never succeed.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Every budget down to the floor ran out of memory.
    #[error(
        "not enough memory to run the rewrite (last budget: {last_budget}); \
         rerun without sorting or on a host with more memory"
    )]
    BudgetFloor { last_budget: ResourceBudget },

    /// The engine failed for a reason unrelated to memory.
    #[error("rewrite failed: {0}")]
    Engine(String),

    #[error("metadata {part} #{index} is not valid UTF-8: {source}")]
    MetadataDecode {
        index: usize,
        part: MetadataPart,
        #[source]
        source: FromUtf8Error,
    },

    #[error("malformed key/value metadata literal: {0}")]
    MetadataLiteral(String),

    #[error("failed to read parquet footer: {0}")]
    Parquet(#[from] ParquetError),

    #[error("{context} ({path}): {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker process could not be started or broke the attempt protocol.
    #[error("worker error: {0}")]
    Worker(String),
}

impl CompressError {
    pub(crate) fn io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// Whether the error is the caller's fault
    pub fn is_precondition(&self) -> bool {
        matches!(self, CompressError::Precondition(_))
    }
}

pub type Result<T, E = CompressError> = std::result::Result<T, E>;
