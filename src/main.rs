use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod build;
mod classify;
mod cli;
mod copy;
mod manifest;
mod output;
mod paths;
mod reconcile;
mod study;

use build::{run_build, BuildPaths};
use cli::BuildArgs;

const DEFAULT_LOG_FILTER: &str = "warn";

fn main() -> Result<()> {
    init_tracing();
    let args = BuildArgs::parse();

    let paths = BuildPaths::resolve(&args)?;
    let (manifest, summary) = run_build(&paths)?;
    tracing::info!(
        conditions = manifest.conditions.len(),
        cases = manifest
            .conditions
            .values()
            .map(|entry| entry.cases.len())
            .sum::<usize>(),
        manifest = %paths.manifest_path.display(),
        "wrote manifest"
    );
    print!("{}", output::render_summary(&paths, &summary));
    Ok(())
}

fn init_tracing() {
    // Logs go to stderr so the summary on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
}
