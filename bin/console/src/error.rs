//! Console startup errors.

use std::fmt;

/// Errors that stop the console before or outside command handling.
#[derive(Debug)]
pub enum ConsoleError {
    /// Configuration could not be loaded.
    Config { reason: String },
    /// The backend client could not be constructed.
    Backend,
    /// Reading input or writing output failed.
    Io { reason: String },
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { reason } => write!(f, "invalid configuration: {reason}"),
            Self::Backend => write!(f, "failed to set up backend client"),
            Self::Io { reason } => write!(f, "console I/O failed: {reason}"),
        }
    }
}

impl std::error::Error for ConsoleError {}

impl From<config::ConfigError> for ConsoleError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config {
            reason: e.to_string(),
        }
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            reason: e.to_string(),
        }
    }
}
