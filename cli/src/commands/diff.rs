//! Diff command
//!
//! Usage: filediff diff <FILE_A> <FILE_B>

use anyhow::Result;
use clap::Args;
use filediff_core::diff::DifferenceArtifact;
use filediff_core::pipeline::Pipeline;

use super::GlobalArgs;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// First input file
    pub file_a: String,

    /// Second input file
    pub file_b: String,
}

/// Execute diff command
pub fn execute(global: &GlobalArgs, args: DiffArgs) -> Result<()> {
    let config = global.load_config()?;
    let pipeline = Pipeline::new(config.build_engine());

    let report = pipeline.compare(&args.file_a, &args.file_b)?;

    if global.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &report.artifact {
        DifferenceArtifact::Produced { path, .. } => {
            println!("Differences saved to: {}", path.display());
        }
        DifferenceArtifact::NoDifference => println!("No differences found."),
    }
    Ok(())
}
