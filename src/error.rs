//! Error types module.
//!
//! This module defines the setup-time error types used throughout dnslatency.
//! Lookup failures inside a worker never surface here; they are folded into
//! a [`ProbeResult`](crate::dns::ProbeResult) instead.

use thiserror::Error;

/// A specialized `Result` type for dnslatency operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for dnslatency.
///
/// Every variant is fatal to a run and is raised before any worker is
/// dispatched, so a failing run never prints a partial table.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (config files, writing the report)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (configuration files, JSON output)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// DNS resolver could not be constructed
    #[error("DNS resolver error: {0}")]
    Resolver(#[from] trust_dns_resolver::error::ResolveError),

    /// Configuration error (invalid settings, missing provider list)
    #[error("Config error: {0}")]
    Config(String),

    /// Parse error (invalid `IP#Name` argument, malformed data)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new parse error with a message.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<color_eyre::Report> for Error {
    fn from(e: color_eyre::Report) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::config("no providers").to_string(), "Config error: no providers");
        assert_eq!(Error::parse("bad ip").to_string(), "Parse error: bad ip");
    }

    #[test]
    fn test_from_eyre_report() {
        let report = color_eyre::eyre::eyre!("hook already installed");
        let err: Error = report.into();
        assert!(matches!(err, Error::Config(msg) if msg == "hook already installed"));
    }
}
