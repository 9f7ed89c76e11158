pub mod geocode;
pub mod rewrite;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::cli::utils::{handle_common_command, load_config};
use common::cli::{CommonArgs, CommonCommands};

/// geoshrink: rewrite GeoParquet files under a memory ceiling
#[derive(Parser, Debug)]
#[command(name = "geoshrink", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Re-encode one or more parquet files into a single compressed file
    Compress(rewrite::CompressArgs),
    /// Like compress, with rows ordered by the given columns
    Sort(rewrite::SortArgs),
    /// Print the GeoJSON (Multi)Polygon of one or more place queries
    Geocode(geocode::GeocodeArgs),
    #[command(flatten)]
    Common(CommonCommands),
    /// Run a single rewrite attempt described by a spec file
    #[command(hide = true)]
    Worker {
        #[arg(long)]
        spec: PathBuf,
    },
}

impl Cli {
    /// Spec file when invoked as a rewrite worker
    pub fn worker_spec(&self) -> Option<&PathBuf> {
        match &self.command {
            Commands::Worker { spec } => Some(spec),
            _ => None,
        }
    }

    pub async fn run(self) -> Result<()> {
        let config = load_config(self.common.config.as_ref())?;

        match self.command {
            Commands::Compress(args) => args.run(config).await,
            Commands::Sort(args) => args.run(config).await,
            Commands::Geocode(args) => args.run(config).await,
            Commands::Common(command) => handle_common_command(&command, &config),
            Commands::Worker { .. } => {
                anyhow::bail!("the worker subcommand runs outside the async runtime")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_worker_subcommand() {
        let cli = Cli::parse_from([
            "geoshrink",
            compressor::WORKER_SUBCOMMAND,
            "--spec",
            "/tmp/attempt.json",
        ]);
        assert_eq!(cli.worker_spec(), Some(&PathBuf::from("/tmp/attempt.json")));

        let cli = Cli::parse_from(["geoshrink", "version"]);
        assert!(cli.worker_spec().is_none());
    }
}
