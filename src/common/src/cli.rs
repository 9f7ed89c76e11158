use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Common CLI arguments shared by every geoshrink command
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

/// Subcommands that inspect the configuration instead of running a job
#[derive(Subcommand, Debug, Clone)]
pub enum CommonCommands {
    /// Show current configuration and exit
    Config {
        #[arg(long, help = "Show configuration in JSON format")]
        json: bool,
    },
    /// Validate configuration and exit
    Validate,
    /// Show version information and exit
    Version,
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::Configuration;
    use crate::stderr::CountingStderr;
    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Log filter derived from the CLI flags, `RUST_LOG` wins when set
    pub fn log_filter(args: &CommonArgs) -> EnvFilter {
        let level = if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        };

        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }

    /// Initialize logging based on CLI arguments; everything goes to stderr
    pub fn init_logging(args: &CommonArgs) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(log_filter(args))
            .with_writer(|| CountingStderr)
            .try_init();
    }

    /// Load configuration with optional override from CLI
    pub fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration> {
        match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Configuration::load_from_path(path).context("Failed to load configuration")
            }
            None => Configuration::load().context("Failed to load configuration"),
        }
    }

    /// Display configuration in human-readable or JSON format
    pub fn display_config(config: &Configuration, json: bool) -> Result<()> {
        if json {
            let json = serde_json::to_string_pretty(config)
                .context("Failed to serialize configuration to JSON")?;
            println!("{json}");
        } else {
            println!("geoshrink configuration:");
            println!("========================");
            println!(
                "Output codec: {} (level {})",
                config.output.codec, config.output.codec_level
            );
            println!("Row group size: {}", config.output.row_group_size);
            println!("Working directory: {}", config.working_directory.display());
            println!("Verbosity: {}", config.verbosity);
            println!("Poll interval: {:?}", config.executor.poll_interval);
            println!(
                "Preemption threshold: {}% (headroom {} bytes)",
                config.executor.threshold_percent, config.executor.headroom_bytes
            );

            match config.executor.memory_limit_gb {
                Some(limit) => println!("Initial memory limit: {limit}GB"),
                None => println!("Initial memory limit: detected from host"),
            }
            match config.executor.thread_limit {
                Some(limit) => println!("Initial thread limit: {limit}"),
                None => println!("Initial thread limit: detected from host"),
            }

            println!("Geocode endpoint: {}", config.geocode.endpoint);
            println!("Geocode cache: {}", config.geocode.cache_dir.display());
        }
        Ok(())
    }

    /// Validate configuration and report any issues
    pub fn validate_config(config: &Configuration) -> Result<()> {
        log::info!("Validating configuration...");

        config.validate()?;

        if config.geocode.endpoint.is_empty() {
            anyhow::bail!("Geocode endpoint cannot be empty");
        }

        log::info!("Configuration validation passed");
        Ok(())
    }

    /// Handle commands that don't run a rewrite job
    pub fn handle_common_command(command: &CommonCommands, config: &Configuration) -> Result<()> {
        match command {
            CommonCommands::Config { json } => display_config(config, *json),
            CommonCommands::Validate => validate_config(config),
            CommonCommands::Version => {
                println!("{}", version_info());
                Ok(())
            }
        }
    }

    /// Standard version information
    pub fn version_info() -> String {
        format!(
            "geoshrink {} (rust {})",
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_RUST_VERSION")
        )
    }
}
