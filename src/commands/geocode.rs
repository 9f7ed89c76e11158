use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use common::config::Configuration;

#[derive(Args, Debug)]
pub struct GeocodeArgs {
    /// Place queries; several are unioned into one MultiPolygon
    #[arg(required = true)]
    pub queries: Vec<String>,

    #[arg(long, help = "Directory of cached lookups (default: from configuration)")]
    pub cache_dir: Option<PathBuf>,
}

impl GeocodeArgs {
    pub async fn run(self, mut config: Configuration) -> Result<()> {
        if let Some(dir) = self.cache_dir {
            config.geocode.cache_dir = dir;
        }

        let geometry = ::geocode::geocode_to_geometry(&config.geocode, &self.queries)
            .await
            .with_context(|| format!("Failed to geocode {:?}", self.queries))?;

        println!("{}", geometry.to_geojson()?);
        Ok(())
    }
}
