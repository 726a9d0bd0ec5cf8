//! Configuration for a purge run.
//!
//! Two pieces: `PurgeConfig`, the loop tuning knobs with named fields and
//! defaults matching the reference deployment, and `Credentials`, the
//! endpoint and bearer token read from the environment at startup. Missing
//! credentials are fatal before any remote call is made.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable naming the service base endpoint URL.
pub const ENV_URL: &str = "SCOUR_URL";
/// Environment variable naming the bearer credential.
pub const ENV_TOKEN: &str = "SCOUR_TOKEN";

/// The remote API's maximum page size; `batch_size` may not exceed it.
pub const MAX_BATCH_SIZE: u32 = 1000;

/// Loop tuning knobs.
///
/// The two wait intervals cover two different causes of delay and are never
/// conflated: `retry_wait` backs off transient query failures, `settle_wait`
/// gives the index time to absorb deletes that were already acknowledged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Identifiers requested per poll (max 1000).
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Simultaneous in-flight delete requests.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Consecutive poll failures tolerated before aborting.
    #[serde(default = "default_max_tries")]
    pub max_tries: u32,

    /// Pause between poll retries after a transient failure.
    #[serde(default = "default_retry_wait")]
    pub retry_wait: Duration,

    /// Pause while waiting for issued deletes to reach the index.
    #[serde(default = "default_settle_wait")]
    pub settle_wait: Duration,

    /// Disable TLS certificate verification. Only for private
    /// trusted-network deployments.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Poll and diff but send no deletes; stop after the first poll.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_batch_size() -> u32 {
    1000
}

fn default_concurrency() -> usize {
    16
}

fn default_max_tries() -> u32 {
    5
}

fn default_retry_wait() -> Duration {
    Duration::from_secs(1)
}

fn default_settle_wait() -> Duration {
    Duration::from_secs(30)
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            max_tries: default_max_tries(),
            retry_wait: default_retry_wait(),
            settle_wait: default_settle_wait(),
            accept_invalid_certs: false,
            dry_run: false,
        }
    }
}

impl PurgeConfig {
    /// Reject values the remote API or the loop cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "batch_size",
                message: format!("must be between 1 and {}", MAX_BATCH_SIZE),
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_tries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_tries",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Endpoint and bearer token for the hosted service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub base_url: String,
    pub token: String,
}

impl Credentials {
    /// Read `SCOUR_URL` and `SCOUR_TOKEN` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(ENV_URL).map_err(|_| ConfigError::MissingEnv {
            name: ENV_URL,
            hint: "the service base endpoint URL",
        })?;
        let token = std::env::var(ENV_TOKEN).map_err(|_| ConfigError::MissingEnv {
            name: ENV_TOKEN,
            hint: "the service API bearer token",
        })?;
        Ok(Self { base_url, token })
    }
}
