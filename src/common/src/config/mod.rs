use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::verbosity::Verbosity;

/// One gibibyte, the unit of every memory budget.
pub const MEMORY_1GB: u64 = 1024 * 1024 * 1024;

/// Default configuration file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "geoshrink.toml";

/// Prefix for environment overrides, e.g. `GEOSHRINK__OUTPUT__CODEC=snappy`.
pub const ENV_PREFIX: &str = "GEOSHRINK__";

/// Parquet compression codecs accepted by the rewrite engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ParquetCodec {
    Zstd,
    Snappy,
    Gzip,
    Brotli,
    Lz4,
    #[value(name = "lz4_raw")]
    Lz4Raw,
    Uncompressed,
}

impl ParquetCodec {
    /// Whether the codec takes a compression level.
    pub fn has_level(&self) -> bool {
        matches!(self, Self::Zstd | Self::Gzip | Self::Brotli)
    }

    /// Render the codec the way the engine's `compression` option expects it,
    /// e.g. `zstd(3)` or `snappy`.
    pub fn engine_option(&self, level: i32) -> String {
        if self.has_level() {
            format!("{self}({level})")
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for ParquetCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParquetCodec::Zstd => "zstd",
            ParquetCodec::Snappy => "snappy",
            ParquetCodec::Gzip => "gzip",
            ParquetCodec::Brotli => "brotli",
            ParquetCodec::Lz4 => "lz4",
            ParquetCodec::Lz4Raw => "lz4_raw",
            ParquetCodec::Uncompressed => "uncompressed",
        };
        write!(f, "{s}")
    }
}

/// Encoding parameters of the rewritten file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Compression codec of the final parquet file
    pub codec: ParquetCodec,
    /// Compression level; ignored by codecs without levels
    pub codec_level: i32,
    /// Approximate number of rows per row group
    pub row_group_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            codec: ParquetCodec::Zstd,
            codec_level: 3,
            row_group_size: 100_000,
        }
    }
}

/// Supervision settings of the resource-adaptive executor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutorSettings {
    /// Interval between two host memory samples while an attempt runs
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Preemption threshold used when the headroom rule is looser
    pub threshold_percent: f64,
    /// Memory that must always stay free on the host
    pub headroom_bytes: u64,
    /// Initial memory budget; detected from the host when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit_gb: Option<f64>,
    /// Initial thread budget; detected from the host when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_limit: Option<usize>,
    /// Binary spawned for every attempt; defaults to the running executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_executable: Option<PathBuf>,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            threshold_percent: 95.0,
            headroom_bytes: MEMORY_1GB,
            memory_limit_gb: None,
            thread_limit: None,
            worker_executable: None,
        }
    }
}

/// Settings of the geocoding lookup
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Directory holding one cached result per query hash
    pub cache_dir: PathBuf,
    /// Base URL of the Nominatim-compatible search service
    pub endpoint: String,
    /// User agent sent with every request, required by Nominatim's usage policy
    pub user_agent: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            endpoint: String::from("https://nominatim.openstreetmap.org"),
            user_agent: format!("geoshrink/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    /// Encoding of rewritten files
    pub output: OutputConfig,
    /// Executor supervision and budget settings
    pub executor: ExecutorSettings,
    /// Parent of the per-call scratch directories
    pub working_directory: PathBuf,
    /// Amount of user-facing progress output
    pub verbosity: Verbosity,
    /// Geocoding lookup settings
    pub geocode: GeocodeConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            executor: ExecutorSettings::default(),
            working_directory: PathBuf::from("files"),
            verbosity: Verbosity::Transient,
            geocode: GeocodeConfig::default(),
        }
    }
}

/// Invalid value found while validating a loaded configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration value for {}: {}", self.field, self.reason)
    }
}

impl Error for ConfigError {}

impl Configuration {
    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Configuration::default()))
    }

    /// Load defaults, then `geoshrink.toml`, then `GEOSHRINK__` environment overrides
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Self::figment()
            .merge(Toml::file(DEFAULT_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Same as [`Configuration::load`] with an explicit configuration file
    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        let config = Self::figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.row_group_size == 0 {
            return Err(ConfigError {
                field: "output.row_group_size",
                reason: "must be greater than zero".to_string(),
            });
        }

        let executor = &self.executor;
        if executor.poll_interval.is_zero() {
            return Err(ConfigError {
                field: "executor.poll_interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(executor.threshold_percent > 0.0 && executor.threshold_percent <= 100.0) {
            return Err(ConfigError {
                field: "executor.threshold_percent",
                reason: format!("{} is outside (0, 100]", executor.threshold_percent),
            });
        }
        if let Some(limit) = executor.memory_limit_gb {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(ConfigError {
                    field: "executor.memory_limit_gb",
                    reason: format!("{limit} is not a finite positive number"),
                });
            }
        }
        if executor.thread_limit == Some(0) {
            return Err(ConfigError {
                field: "executor.thread_limit",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
