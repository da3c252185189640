//! filediff CLI
//!
//! Command-line interface for filediff-core

use clap::{Parser, Subcommand};
use filediff_core::logging::{self, Profile};
use filediff_core::CoreError;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "filediff")]
#[command(about = "filediff - XOR binary diff with a supervised transform stage", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: commands::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// XOR two files and save the difference
    Diff(commands::diff::DiffArgs),
    /// Diff two files, then run the transform helper over the difference
    Transform(commands::transform::TransformArgs),
}

fn main() {
    let cli = Cli::parse();

    logging::init(if cli.global.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(&cli.global, args),
        Commands::Transform(args) => commands::transform::execute(&cli.global, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        let code = match e.downcast_ref::<CoreError>() {
            Some(err) if err.is_input_error() => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
