//! Terminal progress indicator.

use crate::dns::dispatcher::ProgressObserver;
use crate::dns::types::{ProbeResult, Provider};
use std::io::Write;

/// Single-line progress counter written to stderr.
#[derive(Debug, Default)]
pub struct TerminalProgress;

impl TerminalProgress {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn status(line: &str) {
        let mut err = std::io::stderr().lock();
        // Trailing spaces wipe leftovers of a longer previous line.
        let _ = write!(err, "\r{line:<60}");
        let _ = err.flush();
    }
}

impl ProgressObserver for TerminalProgress {
    fn on_dispatch(&self, provider: &Provider, index: usize, total: usize) {
        Self::status(&format!("Dispatching [{:>3}/{}] {}", index + 1, total, provider.name));
    }

    fn on_result(&self, result: &ProbeResult, received: usize, total: usize) {
        Self::status(&format!(
            "Doing lookups [{:>3}/{}] {}",
            received,
            total,
            result.provider().name
        ));
    }

    fn on_finish(&self) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err);
    }
}
