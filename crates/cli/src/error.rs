//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:   success
//! - 2:   clap arg parse error (automatic, before our code runs)
//! - 10:  setup error (invalid config, dimensions, endpoints, not ready)
//! - 11:  I/O error (PNG write, signal handler, thread failure)
//! - 12:  input error (bad JSON config)
//! - 13:  serialization error
//! - 14:  pointer injection failed during replay
//! - 130: walk cancelled with Ctrl+C

use noise_walk_core::WalkError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
pub enum CliError {
    /// A setup error from the core or stepper.
    Walk(WalkError),
    Io(String),
    /// A user input error (bad JSON config).
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
    /// The pointer sink failed mid-walk.
    Injection(String),
    /// The walk was stopped by the user.
    Cancelled,
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Walk(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
            CliError::Injection(_) => 14,
            CliError::Cancelled => 130,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Walk(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
            CliError::Injection(msg) => write!(f, "pointer injection failed: {msg}"),
            CliError::Cancelled => write!(f, "walk cancelled"),
        }
    }
}

impl From<WalkError> for CliError {
    fn from(e: WalkError) -> Self {
        match e {
            WalkError::Io(msg) => CliError::Io(msg),
            WalkError::Injection(msg) => CliError::Injection(msg),
            other => CliError::Walk(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
