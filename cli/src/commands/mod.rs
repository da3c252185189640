//! Subcommands and the flags they share.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use filediff_core::config::CoreConfig;

pub mod diff;
pub mod transform;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for difference artifacts and transform output
    #[arg(long, global = true)]
    pub artifact_dir: Option<PathBuf>,

    /// Helper used for inputs over the size threshold
    #[arg(long, global = true)]
    pub large_diff_bin: Option<PathBuf>,

    /// Transform helper executable
    #[arg(long, global = true)]
    pub transform_bin: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

impl GlobalArgs {
    /// Defaults, then `--config`, then environment, then flags.
    pub fn load_config(&self) -> Result<CoreConfig> {
        let mut config = match &self.config {
            Some(path) => CoreConfig::from_json_file(path)?,
            None => CoreConfig::default(),
        };
        config.apply_env();

        if let Some(dir) = &self.artifact_dir {
            config.artifact_dir = dir.clone();
        }
        if let Some(bin) = &self.large_diff_bin {
            config.large_diff.binary = Some(bin.clone());
        }
        if let Some(bin) = &self.transform_bin {
            config.transform.binary = Some(bin.clone());
        }

        config.validate()?;
        Ok(config)
    }
}
