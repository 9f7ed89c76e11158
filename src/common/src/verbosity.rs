//! User-facing progress verbosity shared by every entry point.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much progress output a call may produce.
///
/// `Silent` disables output completely. `Transient` reports progress but
/// clears it once the call finished. `Verbose` keeps every line.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Silent,
    #[default]
    Transient,
    Verbose,
}

impl Verbosity {
    pub fn is_silent(&self) -> bool {
        matches!(self, Verbosity::Silent)
    }

    /// Whether progress lines stay on screen after the call finished
    pub fn keeps_output(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verbosity::Silent => "silent",
            Verbosity::Transient => "transient",
            Verbosity::Verbose => "verbose",
        };
        write!(f, "{s}")
    }
}
