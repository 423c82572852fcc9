//! `m3u-enrich` entry point.

mod cli;
mod report;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use core_metadata::EntryDecision;
use core_runtime::config::EnricherConfig;
use core_runtime::logging::{init_logging, strip_path};
use core_service::{bootstrap_desktop, RunOptions, RunStatus};
use tracing::debug;

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logging_config()).context("Failed to initialize logging")?;

    let config = cli.apply_to(EnricherConfig::from_env().context("Invalid configuration")?);
    debug!(?config, "Configuration loaded");

    let mut service = bootstrap_desktop(&config).context("Failed to start enricher")?;
    if cli.verbose {
        // Dry runs keep stdout for the rendered playlist.
        let dry_run = cli.dry_run;
        service = service.with_decision_observer(Arc::new(move |decision: &EntryDecision| {
            let line = report::decision_line(decision);
            if dry_run {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }));
    }
    let options = RunOptions {
        dry_run: cli.dry_run,
    };

    let outcome = service
        .run(&cli.playlist, options)
        .await
        .with_context(|| format!("Failed to enrich {}", cli.playlist.display()))?;

    let playlist_path = cli.playlist.to_string_lossy();
    let summary = report::summary_line(strip_path(&playlist_path), &outcome);
    if outcome.status == RunStatus::DryRun {
        print!("{}", outcome.rendered);
        eprintln!("{}", summary);
    } else {
        println!("{}", summary);
    }

    Ok(())
}
