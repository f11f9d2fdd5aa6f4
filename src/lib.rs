/*!
 * cdh-ttrpc - command-line client for the Confidential Data Hub
 *
 * Thin front end over `cdh-connect`:
 * - Unseal sealed secrets
 * - Mount secure volumes
 * - Fetch confidential resources
 *
 * Configuration comes from an optional TOML file, overridden by flags and
 * environment variables.
 */

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{ClientConfig, LogLevel};
pub use error::{CliError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
