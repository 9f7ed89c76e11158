use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use common::config::{Configuration, ParquetCodec};
use common::verbosity::Verbosity;
use compressor::{CompressOptions, InputFiles, Pipeline, SortKey};

/// Arguments shared by compress and sort
#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// Input parquet file(s); several are unioned into one output
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output parquet file
    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long, value_enum, help = "Compression codec (default: from configuration)")]
    pub codec: Option<ParquetCodec>,

    #[arg(long, help = "Compression level for codecs that take one")]
    pub level: Option<i32>,

    #[arg(long, help = "Maximum rows per row group")]
    pub row_group_size: Option<usize>,

    #[arg(long, help = "Directory for temporary files")]
    pub working_dir: Option<PathBuf>,

    #[arg(long, value_enum, help = "Progress output")]
    pub verbosity: Option<Verbosity>,

    #[arg(long, help = "Initial memory limit in GB (default: host total)")]
    pub memory_limit_gb: Option<f64>,

    #[arg(long, help = "Initial thread limit (default: all cores)")]
    pub thread_limit: Option<usize>,
}

impl RewriteArgs {
    /// Overlay command-line values on the loaded configuration
    pub fn apply(&self, config: &mut Configuration) {
        if let Some(codec) = self.codec {
            config.output.codec = codec;
        }
        if let Some(level) = self.level {
            config.output.codec_level = level;
        }
        if let Some(size) = self.row_group_size {
            config.output.row_group_size = size;
        }
        if let Some(dir) = &self.working_dir {
            config.working_directory = dir.clone();
        }
        if let Some(verbosity) = self.verbosity {
            config.verbosity = verbosity;
        }
        if let Some(memory) = self.memory_limit_gb {
            config.executor.memory_limit_gb = Some(memory);
        }
        if let Some(threads) = self.thread_limit {
            config.executor.thread_limit = Some(threads);
        }
    }

    fn input_files(&self) -> InputFiles {
        match self.inputs.as_slice() {
            [single] => InputFiles::Single(single.clone()),
            many => InputFiles::Many(many.to_vec()),
        }
    }

    fn prepare(&self, mut config: Configuration) -> Result<(Pipeline, CompressOptions)> {
        self.apply(&mut config);
        config.validate().context("Invalid configuration")?;

        let pipeline = Pipeline::from_config(&config).context("Failed to set up the rewrite")?;
        log::debug!(
            "Rewriting {} input(s) with {} (level {}), row groups of {}",
            self.inputs.len(),
            config.output.codec,
            config.output.codec_level,
            config.output.row_group_size
        );
        Ok((pipeline, CompressOptions::from_config(&config)))
    }
}

#[derive(Args, Debug)]
pub struct CompressArgs {
    #[command(flatten)]
    pub rewrite: RewriteArgs,
}

impl CompressArgs {
    pub async fn run(self, config: Configuration) -> Result<()> {
        let (pipeline, options) = self.rewrite.prepare(config)?;

        let outcome = pipeline
            .compress(self.rewrite.input_files(), &self.rewrite.output, &options)
            .await
            .with_context(|| format!("Failed to compress into {}", self.rewrite.output.display()))?;

        pipeline.executor().metrics().summary().log();
        println!("{}", outcome.output.display());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SortArgs {
    #[command(flatten)]
    pub rewrite: RewriteArgs,

    /// Sort keys as `column`, `column:asc` or `column:desc`
    #[arg(long = "by", required = true, value_delimiter = ',')]
    pub by: Vec<SortKey>,
}

impl SortArgs {
    pub async fn run(self, config: Configuration) -> Result<()> {
        let (pipeline, options) = self.rewrite.prepare(config)?;

        let outcome = pipeline
            .sort(
                self.rewrite.input_files(),
                &self.rewrite.output,
                &self.by,
                &options,
            )
            .await
            .with_context(|| format!("Failed to sort into {}", self.rewrite.output.display()))?;

        pipeline.executor().metrics().summary().log();
        println!("{}", outcome.output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        sort: SortArgs,
    }

    #[test]
    fn test_flags_override_configuration() {
        let cli = TestCli::parse_from([
            "sort",
            "a.parquet",
            "b.parquet",
            "-o",
            "out.parquet",
            "--codec",
            "lz4_raw",
            "--row-group-size",
            "500",
            "--verbosity",
            "silent",
            "--thread-limit",
            "2",
            "--by",
            "h3:desc,id",
        ]);

        let mut config = Configuration::default();
        cli.sort.rewrite.apply(&mut config);

        assert_eq!(config.output.codec, ParquetCodec::Lz4Raw);
        assert_eq!(config.output.codec_level, 3);
        assert_eq!(config.output.row_group_size, 500);
        assert_eq!(config.verbosity, Verbosity::Silent);
        assert_eq!(config.executor.thread_limit, Some(2));
        assert_eq!(
            cli.sort.by,
            vec![SortKey::descending("h3"), SortKey::ascending("id")]
        );
        assert!(matches!(
            cli.sort.rewrite.input_files(),
            InputFiles::Many(paths) if paths.len() == 2
        ));
    }
}
