//! covgen - coverage report driver
//!
//! Run from within a built, instrumented project tree. The driver invokes
//! lcov to capture live and zero-baseline coverage datasets, filters out
//! excluded source paths, merges the two datasets and renders an HTML
//! report with genhtml into the `coverage/` directory.
//!
//! The driver takes no flags, arguments or environment variables; the
//! artifact names, exclusion globs and tool names are fixed. The exit code
//! is 0 on full success, otherwise the exit code of the first failing
//! external command.

use anyhow::{Context, Result};
use clap::Parser;
use covgen_core::{ArtifactLayout, CoveragePipeline, Tools};
use tracing::info;

#[derive(Parser)]
#[command(name = "covgen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate a branch-coverage HTML report for the current directory", long_about = None)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    let _cli = Cli::parse();

    // Contract output (command echo, summary) goes to stdout; logs to stderr.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let layout =
        ArtifactLayout::from_current_dir().context("failed to resolve working directory")?;
    info!(base = %layout.base().display(), "starting coverage pipeline");

    let result = CoveragePipeline::run(&Tools::default(), &layout).await;

    println!();
    for stage in &result.stages {
        let status = if stage.passed() { "✓" } else { "✗" };
        println!(
            "  {} {} ({}ms, exit code: {})",
            status, stage.stage_name, stage.duration_ms, stage.exit_code
        );
    }
    println!();
    println!(
        "Summary: {}/{} stages passed",
        result.passed_count(),
        result.stages.len()
    );

    if let Some(failed) = result.first_failure() {
        if !failed.stderr.is_empty() {
            eprint!("{}", failed.stderr);
        }
        let code = if failed.exit_code > 0 { failed.exit_code } else { 1 };
        std::process::exit(code);
    }

    println!("Report written to {}", layout.report_dir().display());
    Ok(())
}
