//! Scour CLI Binary
//!
//! Entrypoint: parse arguments, initialize logging, load credentials from
//! the environment, then hand off to the convergence controller. Progress
//! goes to stdout; diagnostics go to stderr via tracing.

use clap::Parser;
use scour::cli::{self, Cli, EXIT_CONFIG};
use scour::config::Credentials;
use scour::controller::{PurgeController, PurgeSummary};
use scour::error::ScourError;
use scour::index::{HttpIndexClient, Scope};
use scour::logging::init_logging;
use scour::progress::StdoutReporter;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.logging_config()) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(EXIT_CONFIG);
    }

    let config = cli.purge_config();
    if let Err(e) = config.validate() {
        let e = ScourError::from(e);
        eprintln!("{}", cli::map_error(&e));
        process::exit(cli::exit_code(&e));
    }

    // Credentials are required before any remote call is attempted.
    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => {
            let e = ScourError::from(e);
            eprintln!("{}", cli::map_error(&e));
            process::exit(cli::exit_code(&e));
        }
    };

    let client = match HttpIndexClient::new(&credentials, config.accept_invalid_certs) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_CONFIG);
        }
    };

    let scope = Scope::new(cli.project_id.clone(), cli.collection_id.clone());
    info!(
        project_id = %scope.project_id,
        collection_id = %scope.collection_id,
        dry_run = config.dry_run,
        "Scour starting"
    );

    let controller = PurgeController::new(
        Arc::new(client),
        scope,
        config,
        Arc::new(StdoutReporter),
    );

    match controller.run().await {
        Ok(summary) => {
            report_summary(&summary);
            process::exit(cli::EXIT_OK);
        }
        Err(e) => {
            error!("Purge aborted: {}", e);
            eprintln!("{}", cli::map_error(&e));
            println!("Giving up.");
            process::exit(cli::exit_code(&e));
        }
    }
}

/// Terminal accounting. Failed deletes were still counted as dispatched and
/// were not retried; list them so the operator can re-run or investigate.
fn report_summary(summary: &PurgeSummary) {
    if summary.dry_run {
        return;
    }
    println!(
        "Done. {} delete requests sent over {} polls.",
        summary.dispatched, summary.polls
    );
    if !summary.failed.is_empty() {
        println!(
            "WARNING: {} delete requests failed; these documents may remain:",
            summary.failed.len()
        );
        for document_id in &summary.failed {
            println!("  {}", document_id);
        }
        println!("Re-run scour to retry anything the index still reports.");
    }
}
