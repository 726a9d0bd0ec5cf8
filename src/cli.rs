//! CLI definitions: clap types, config assembly, and exit-code mapping.

use crate::config::PurgeConfig;
use crate::error::ScourError;
use crate::logging::LoggingConfig;
use clap::Parser;
use std::time::Duration;

/// Exit code for a run that drained the collection (or finished a dry run).
pub const EXIT_OK: i32 = 0;
/// Exit code for a run aborted after exhausting poll retries.
pub const EXIT_ABORTED: i32 = 1;
/// Exit code for a startup failure before any remote call.
pub const EXIT_CONFIG: i32 = 2;

/// Scour - purge every document from a hosted search collection
///
/// Queries the collection's index for document identifiers and issues delete
/// requests until the index reports empty. The collection itself is kept.
/// Deleting the documents is NOT reversible; double-check the collection id.
///
/// Requires SCOUR_URL (service base endpoint) and SCOUR_TOKEN (bearer
/// credential) in the environment.
#[derive(Parser)]
#[command(name = "scour")]
#[command(about = "Purge every document from a hosted search collection")]
pub struct Cli {
    /// Project scope identifier
    pub project_id: String,

    /// Collection scope identifier
    pub collection_id: String,

    /// Identifiers requested per index poll (max 1000)
    #[arg(long, default_value = "1000")]
    pub batch_size: u32,

    /// Simultaneous in-flight delete requests
    #[arg(long, default_value = "16")]
    pub concurrency: usize,

    /// Consecutive poll failures tolerated before giving up
    #[arg(long, default_value = "5")]
    pub max_tries: u32,

    /// Seconds between poll retries after a transient failure
    #[arg(long, default_value = "1")]
    pub retry_wait_secs: u64,

    /// Seconds to wait for issued deletes to reach the index
    #[arg(long, default_value = "30")]
    pub settle_wait_secs: u64,

    /// Disable TLS certificate verification (private trusted-network
    /// deployments only)
    #[arg(long)]
    pub insecure: bool,

    /// Poll and diff but send no deletes; stop after the first poll
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose diagnostics (default: warnings only)
    #[arg(long)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

impl Cli {
    /// Assemble the loop config from the parsed flags.
    pub fn purge_config(&self) -> PurgeConfig {
        PurgeConfig {
            batch_size: self.batch_size,
            concurrency: self.concurrency,
            max_tries: self.max_tries,
            retry_wait: Duration::from_secs(self.retry_wait_secs),
            settle_wait: Duration::from_secs(self.settle_wait_secs),
            accept_invalid_certs: self.insecure,
            dry_run: self.dry_run,
        }
    }

    /// Build logging configuration. Precedence: explicit flags override
    /// --verbose override defaults; SCOUR_LOG env still wins inside
    /// init_logging.
    pub fn logging_config(&self) -> LoggingConfig {
        let mut config = LoggingConfig::default();
        if self.verbose {
            config.level = "debug".to_string();
        }
        if let Some(ref level) = self.log_level {
            config.level = level.clone();
        }
        if let Some(ref format) = self.log_format {
            config.format = format.clone();
        }
        config
    }
}

/// Map a run error to its process exit code. Three-way distinction: ran to
/// completion, aborted mid-run, refused at startup.
pub fn exit_code(e: &ScourError) -> i32 {
    match e {
        ScourError::Config(_) => EXIT_CONFIG,
        ScourError::RetriesExhausted { .. } => EXIT_ABORTED,
    }
}

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ScourError) -> String {
    e.to_string()
}
