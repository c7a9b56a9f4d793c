//! Result reporter.
//!
//! Drains a [`Dispatch`] and renders the collected results. The reporter
//! only relies on the channel contract: exactly `expected()` results arrive
//! in no particular order.

pub mod table;

use crate::cli::OutputFormat;
use crate::dns::dispatcher::Dispatch;
use crate::dns::resolver::ResolverMode;
use crate::dns::types::{ProbeResult, TestSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::io::Write;

/// Row ordering of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Order in which results arrived
    Arrival,
    /// Provider name, then address
    Name,
    /// Fastest first, failures last
    #[default]
    Latency,
}

impl SortOrder {
    /// Get all available sort order names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["arrival", "name", "latency"]
    }

    /// Sort results in place.
    pub fn apply(self, results: &mut [ProbeResult]) {
        match self {
            Self::Arrival => {}
            Self::Name => results.sort_by(|a, b| a.provider().cmp(b.provider())),
            Self::Latency => results.sort_by(compare_latency),
        }
    }
}

fn compare_latency(a: &ProbeResult, b: &ProbeResult) -> Ordering {
    match (a.average(), b.average()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.provider().cmp(b.provider()))
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arrival" => Ok(Self::Arrival),
            "name" => Ok(Self::Name),
            "latency" => Ok(Self::Latency),
            _ => Err(format!(
                "Unknown sort order: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arrival => write!(f, "arrival"),
            Self::Name => write!(f, "name"),
            Self::Latency => write!(f, "latency"),
        }
    }
}

/// Receive exactly as many results as were dispatched.
///
/// If the channel closes early (a worker died without reporting) the
/// shortfall is logged and the results received so far are returned.
pub async fn collect(dispatch: Dispatch) -> Vec<ProbeResult> {
    drain(dispatch).await.0
}

/// Like [`collect`], also returning how many workers panicked.
pub async fn drain(mut dispatch: Dispatch) -> (Vec<ProbeResult>, usize) {
    let expected = dispatch.expected();
    let mut results = Vec::with_capacity(expected);

    while results.len() < expected {
        match dispatch.recv().await {
            Some(result) => {
                tracing::debug!("received result for {}", result.provider());
                dispatch
                    .observer()
                    .on_result(&result, results.len() + 1, expected);
                results.push(result);
            }
            None => {
                tracing::warn!(
                    "result channel closed after {} of {} results",
                    results.len(),
                    expected
                );
                break;
            }
        }
    }

    dispatch.observer().on_finish();
    let panicked = dispatch.join().await;
    (results, panicked)
}

/// A finished run, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Which resolver answered the lookups
    pub mode: ResolverMode,
    /// Lookups per domain
    pub repetitions: usize,
    /// Hostnames that were resolved
    pub domains: Vec<String>,
    /// One entry per provider
    pub results: Vec<ProbeResult>,
    /// Aggregated statistics
    pub summary: TestSummary,
}

impl Report {
    /// Build a report, ordering results by `sort`.
    #[must_use]
    pub fn new(
        mut results: Vec<ProbeResult>,
        sort: SortOrder,
        mode: ResolverMode,
        repetitions: usize,
        domains: Vec<String>,
    ) -> Self {
        sort.apply(&mut results);
        let summary = TestSummary::from_results(&results);
        Self {
            generated_at: Utc::now(),
            mode,
            repetitions,
            domains,
            results,
            summary,
        }
    }

    /// Fastest successful result.
    #[must_use]
    pub fn fastest(&self) -> Option<&ProbeResult> {
        self.results
            .iter()
            .filter(|r| r.is_success())
            .min_by(|a, b| compare_latency(a, b))
    }

    /// Write the report in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write<W: Write>(&self, out: &mut W, format: OutputFormat) -> crate::Result<()> {
        match format {
            OutputFormat::Table => {
                table::write_table(out, &self.results)?;
                table::write_recommendation(out)?;
                if let Some(fastest) = self.fastest() {
                    writeln!(
                        out,
                        "\nFastest: {} ({})",
                        fastest.provider().name,
                        fastest.provider().ip
                    )?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
            }
            OutputFormat::Csv => table::write_csv(out, &self.results)?,
        }
        Ok(())
    }
}
