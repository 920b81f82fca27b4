//! flatup - upstream version resolver and manifest updater CLI tool
//!
//! Discovers the latest upstream version of each dependency declared in a
//! rule file, fetches and checksums changed artifacts, and renders the
//! results into template files.

use clap::Parser;
use flatup::cli::CliArgs;
use flatup::orchestrator::Orchestrator;
use flatup::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("flatup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Config:   {}", args.config.display());
        eprintln!("Manifest: {}", args.manifest.display());
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let orchestrator = Orchestrator::new(args.run_options())?;
    let report = orchestrator.run(args.show_progress()).await?;

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    // partial success is surfaced, not swallowed: some modules may have been
    // resolved and rendered while others failed
    if !report.is_complete() {
        return Ok(ExitCode::from(2));
    }

    Ok(ExitCode::SUCCESS)
}
