//! dnslatency - Measure DNS resolution latency across public DNS providers.
//!
//! This crate provides both a library API and a CLI tool that:
//! - Runs one concurrent worker per DNS provider
//! - Resolves a list of domains several times per provider, each lookup
//!   bounded by a timeout
//! - Reports the average lookup time per provider, or `Timeout` when a
//!   provider failed
//!
//! # Library Usage
//!
//! ```ignore
//! use dnslatency::{build_lookup, dispatch, report, NoProgress, Plan, ResolverMode};
//!
//! let lookup = build_lookup(ResolverMode::Provider, &providers, timeout)?;
//! let run = dispatch(&providers, &plan, lookup, Arc::new(NoProgress));
//! let results = report::collect(run).await;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Measure the built-in providers
//! dnslatency
//!
//! # Custom providers and domains
//! dnslatency run --dns 1.1.1.1#Cloudflare --dns 9.9.9.9#Quad9 --domain rust-lang.org
//!
//! # Use the system resolver for every provider
//! dnslatency run --system-resolver
//!
//! # List or export the configured providers
//! dnslatency list
//! dnslatency export --output providers.json
//! ```
//!
//! # Known limitations
//!
//! There is no run-wide cancellation: a worker waiting on a lookup is only
//! released by that lookup's timeout.

pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod progress;
pub mod report;

// Re-export commonly used types
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{ConfigLoader, MeasureConfig, ProviderList};
pub use dns::types::{FailureReason, ProbeRequest, ProbeResult, Provider, TestSummary};
pub use dns::{
    build_lookup, dispatch, Dispatch, Lookup, NoProgress, Plan, ProgressObserver, ResolverMode,
};
pub use error::{Error, Result};
pub use report::{Report, SortOrder};
