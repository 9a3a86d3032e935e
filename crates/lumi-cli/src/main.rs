//! lumipileup CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod pileup_json;

#[derive(Parser)]
#[command(name = "lumipileup")]
#[command(about = "lumipileup - pileup mean/RMS per lumi section from per-bunch luminosity")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-run, per-lumi-section pileup JSON from a per-bunch luminosity CSV
    PileupJson {
        /// Per-bunch luminosity CSV export (must include crossing data, `--xing`)
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Comma-separated list of BXs to use (all BXs by default)
        #[arg(short = 'b', long)]
        sel_bx: Option<String>,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::PileupJson { input, output, sel_bx } => {
            pileup_json::cmd_pileup_json(&input, output.as_deref(), sel_bx.as_deref())
        }
        Commands::Version => {
            println!("lumipileup {}", lumi_core::VERSION);
            Ok(())
        }
    }
}
