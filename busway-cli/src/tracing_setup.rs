//! Tracing setup for the busway CLI
//!
//! Log lines go to stderr so they never interleave with the menu on stdout.
//!
//! Usage:
//!   busway --debug ...              # Debug logging (includes executed SQL)
//!   RUST_LOG=busway_core=debug busway
//!
//! Environment variables:
//!   RUST_LOG                        # Log filter (default: warn)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (used unless RUST_LOG is explicitly set)
    pub debug: bool,
}

/// Initialize console tracing
pub fn init(config: &TracingConfig) -> Result<()> {
    let default_level = if config.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
