/*!
 * Error types and process exit codes for the CDH client CLI
 */

use cdh_connect::ConnectError;
use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CALL_FAILED: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Cdh(#[from] ConnectError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cdh(e) => connect_exit_code(e),
            // Local failures: bad config or arguments, unwritable output
            CliError::Config(_) | CliError::InvalidArgument(_) | CliError::Io(_) => EXIT_FATAL,
        }
    }
}

fn connect_exit_code(err: &ConnectError) -> i32 {
    if err.is_connect() {
        EXIT_FATAL
    } else {
        // The CDH answered but the call failed
        EXIT_CALL_FAILED
    }
}

/// Categorize an error into an exit code by downcasting along its chain
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return cli_err.exit_code();
        }
        if let Some(connect_err) = cause.downcast_ref::<ConnectError>() {
            return connect_exit_code(connect_err);
        }
    }
    EXIT_FATAL
}

/// Render an error chain on one line, skipping causes whose text the
/// parent message already includes
pub fn render_chain(err: &anyhow::Error) -> String {
    let mut out = String::new();
    let mut parent = String::new();

    for cause in err.chain() {
        let message = cause.to_string();
        if !parent.contains(&message) {
            if !out.is_empty() {
                out.push_str(": ");
            }
            out.push_str(&message);
        }
        parent = message;
    }

    out
}
