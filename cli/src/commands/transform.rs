//! Transform command
//!
//! Usage: filediff transform <FILE_A> <FILE_B> --transform-bin <BIN>

use anyhow::Result;
use clap::Args;
use filediff_core::pipeline::Pipeline;

use super::GlobalArgs;

#[derive(Debug, Args)]
pub struct TransformArgs {
    /// First input file
    pub file_a: String,

    /// Second input file
    pub file_b: String,
}

/// Execute transform command
pub fn execute(global: &GlobalArgs, args: TransformArgs) -> Result<()> {
    let config = global.load_config()?;
    let pipeline = Pipeline::new(config.build_engine()).with_transform(config.build_transform_stage()?);

    let report = pipeline.compare_and_transform(&args.file_a, &args.file_b)?;

    if global.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Result saved to: {}", report.result.output_path.display());
    println!("Peak memory: {:.2} MB", report.result.peak_memory_mb);
    Ok(())
}
