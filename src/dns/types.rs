//! DNS types and data structures.
//!
//! This module provides the core types used by the measurement harness:
//! providers, per-worker requests, measurement results and summary
//! statistics.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// DNS provider information.
///
/// A named resolver endpoint. Names are not unique across a provider list
/// (e.g. `Google` and `Google.2`), so the `(name, ip)` pair is the identity
/// key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Provider {
    /// Display name (e.g., "Cloudflare", "Quad9.2")
    pub name: String,
    /// IP address of the resolver
    pub ip: String,
}

impl Provider {
    /// Create a new provider.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let provider = Provider::new("Cloudflare", "1.1.1.1");
    /// ```
    pub fn new(name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip: ip.into(),
        }
    }

    /// Parse the IP address string into an `IpAddr`.
    #[must_use]
    pub fn ip_addr(&self) -> Option<IpAddr> {
        self.ip.parse().ok()
    }

    /// Check if the provider uses IPv4.
    #[must_use]
    pub fn is_ipv4(&self) -> bool {
        self.ip_addr().is_some_and(|ip| ip.is_ipv4())
    }

    /// Check if the provider uses IPv6.
    #[must_use]
    pub fn is_ipv6(&self) -> bool {
        self.ip_addr().is_some_and(|ip| ip.is_ipv6())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ip)
    }
}

/// Input of a single worker.
///
/// Built by the dispatcher and moved into exactly one worker task.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// Budget for each individual lookup
    pub timeout: Duration,
    /// Hostnames to resolve, in order
    pub domains: Vec<String>,
    /// Lookups per domain, at least 1
    pub repetitions: usize,
    /// Provider being measured
    pub provider: Provider,
}

impl ProbeRequest {
    /// Total number of lookups a fully successful measurement performs.
    #[must_use]
    pub fn total_lookups(&self) -> usize {
        self.repetitions * self.domains.len()
    }
}

/// Why a measurement was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FailureReason {
    /// A lookup exceeded its budget
    Timeout {
        /// Domain whose lookup timed out
        domain: String,
    },
    /// The resolver returned an error (NXDOMAIN, refused, unreachable...)
    Resolve {
        /// Domain whose lookup failed
        domain: String,
        /// Resolver error message
        message: String,
    },
}

impl FailureReason {
    /// Check if the failure was a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { domain } => write!(f, "timeout resolving {domain}"),
            Self::Resolve { domain, message } => write!(f, "{domain}: {message}"),
        }
    }
}

/// Terminal outcome of one worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeResult {
    /// Every lookup succeeded within its budget
    Success {
        provider: Provider,
        #[serde(rename = "average_ms", serialize_with = "as_millis_f64")]
        average: Duration,
    },
    /// A lookup failed or timed out; the rest of the measurement was skipped
    Failure {
        provider: Provider,
        reason: FailureReason,
        #[serde(rename = "latency_at_timeout_ms", serialize_with = "as_millis_f64")]
        latency_at_timeout: Duration,
    },
}

impl ProbeResult {
    /// Create a successful result.
    #[must_use]
    pub fn success(provider: Provider, average: Duration) -> Self {
        Self::Success { provider, average }
    }

    /// Create a failed result.
    #[must_use]
    pub fn failure(
        provider: Provider,
        reason: FailureReason,
        latency_at_timeout: Duration,
    ) -> Self {
        Self::Failure {
            provider,
            reason,
            latency_at_timeout,
        }
    }

    /// The provider this result belongs to.
    #[must_use]
    pub fn provider(&self) -> &Provider {
        match self {
            Self::Success { provider, .. } | Self::Failure { provider, .. } => provider,
        }
    }

    /// Check if the result is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Average latency, `None` for failures.
    #[must_use]
    pub fn average(&self) -> Option<Duration> {
        match self {
            Self::Success { average, .. } => Some(*average),
            Self::Failure { .. } => None,
        }
    }

    /// Average latency in milliseconds, `None` for failures.
    #[must_use]
    pub fn average_ms(&self) -> Option<f64> {
        self.average().map(millis)
    }

    /// Failure reason, `None` for successes.
    #[must_use]
    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }
}

/// Convert a duration to fractional milliseconds.
#[must_use]
pub fn millis(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

fn as_millis_f64<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(millis(*d))
}

/// Overall run summary statistics.
///
/// Aggregated from the results after the reporter has drained them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TestSummary {
    /// Total number of providers measured
    pub total: usize,
    /// Number of successful measurements
    pub success: usize,
    /// Number of measurements abandoned on a resolver error
    pub failed: usize,
    /// Number of measurements abandoned on a timeout
    pub timeout: usize,
    /// Mean of the per-provider averages in milliseconds
    pub avg_latency: Option<f64>,
    /// Fastest per-provider average in milliseconds
    pub min_latency: Option<f64>,
    /// Slowest per-provider average in milliseconds
    pub max_latency: Option<f64>,
}

impl TestSummary {
    /// Create a new empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a summary from a slice of results.
    #[must_use]
    pub fn from_results(results: &[ProbeResult]) -> Self {
        let mut summary = Self::new();
        for result in results {
            summary.add_result(result);
        }
        summary
    }

    /// Add a result to the summary.
    pub fn add_result(&mut self, result: &ProbeResult) {
        self.total += 1;
        match result {
            ProbeResult::Success { .. } => {
                self.success += 1;
                if let Some(latency) = result.average_ms() {
                    self.avg_latency = Some(
                        self.avg_latency
                            .map(|a| {
                                a.mul_add((self.success - 1) as f64, latency)
                                    / self.success as f64
                            })
                            .unwrap_or(latency),
                    );
                    self.min_latency =
                        Some(self.min_latency.map(|m| m.min(latency)).unwrap_or(latency));
                    self.max_latency =
                        Some(self.max_latency.map(|m| m.max(latency)).unwrap_or(latency));
                }
            }
            ProbeResult::Failure { reason, .. } if reason.is_timeout() => self.timeout += 1,
            ProbeResult::Failure { .. } => self.failed += 1,
        }
    }

    /// Calculate success rate as a percentage.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }
}
