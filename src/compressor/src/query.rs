//! Declarative read queries for the rewrite worker
//!
//! Source paths are never interpolated into SQL. They travel next to the
//! query text and are registered with the engine as the `original_data`
//! view; the text only references that view.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CompressError, Result};

/// Name under which the worker registers the union of all source files
pub const SOURCE_VIEW: &str = "original_data";

/// A column to order the rewritten rows by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    fn to_sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {direction}", quote_identifier(&self.column))
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    /// Parses `column`, `column:asc` or `column:desc`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (column, direction) = match s.rsplit_once(':') {
            Some((column, direction)) => (column, Some(direction)),
            None => (s, None),
        };

        if column.is_empty() {
            return Err(format!("sort key '{s}' has an empty column name"));
        }

        match direction.map(|d| d.to_ascii_lowercase()).as_deref() {
            None | Some("asc") => Ok(SortKey::ascending(column)),
            Some("desc") => Ok(SortKey::descending(column)),
            Some(other) => Err(format!(
                "unknown sort direction '{other}', expected 'asc' or 'desc'"
            )),
        }
    }
}

/// Quote an identifier, doubling embedded double quotes
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Query text plus the files it reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteQuery {
    /// Files unioned into [`SOURCE_VIEW`], in caller order
    pub sources: Vec<PathBuf>,
    /// SQL evaluated against [`SOURCE_VIEW`]
    pub sql: String,
}

impl RewriteQuery {
    /// Pass-through projection of every column of every source file
    pub fn read(sources: Vec<PathBuf>) -> Result<Self> {
        Self::read_ordered(sources, &[])
    }

    /// Pass-through projection ordered by the given keys
    pub fn read_ordered(sources: Vec<PathBuf>, order_by: &[SortKey]) -> Result<Self> {
        if sources.is_empty() {
            return Err(CompressError::Precondition(
                "at least one input file is required".to_string(),
            ));
        }

        let mut sql = format!("SELECT {SOURCE_VIEW}.* FROM {SOURCE_VIEW}");
        if !order_by.is_empty() {
            let keys: Vec<String> = order_by.iter().map(SortKey::to_sql).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        Ok(Self { sources, sql })
    }
}

impl fmt::Display for RewriteQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} source file(s)]", self.sql, self.sources.len())
    }
}
