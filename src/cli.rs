//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`.
//! It supports measuring providers (the default), listing and exporting
//! the configured provider list, and generating shell completions.

use crate::config::defaults;
use crate::dns::resolver::ResolverMode;
use crate::report::SortOrder;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default lookup timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = defaults::DEFAULT_TIMEOUT.as_millis() as u64;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// match cli.command {
///     Some(Commands::Run(args)) => { /* ... */ }
///     None => { /* measure with defaults */ }
///     _ => {}
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "dnslatency",
    version,
    about = "Measure DNS resolution latency across public DNS providers",
    long_about = "Resolves a set of domains several times through each DNS provider and \
                  reports the average lookup time per provider",
    infer_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors, no progress)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned table (default, human-readable)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl OutputFormat {
    /// Get all available output format names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["table", "json", "csv"]
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!(
                "Unknown format: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Where the provider and domain lists come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Provider list file (JSON format)
    #[arg(short, long, env = "DNSLATENCY_FILE")]
    pub file: Option<PathBuf>,

    /// Custom DNS providers (format: IP#Name)
    #[arg(long = "dns")]
    pub dns_servers: Vec<String>,

    /// Domains to resolve
    #[arg(long = "domain")]
    pub domains: Vec<String>,
}

/// Settings of a measurement run.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of lookups per domain
    #[arg(short, long, default_value_t = defaults::DEFAULT_REPETITIONS)]
    pub count: usize,

    /// Timeout of a single lookup in milliseconds
    #[arg(short, long = "timeout-ms", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Resolve through the system resolver instead of each provider
    #[arg(long)]
    pub system_resolver: bool,

    /// Row order of the report
    #[arg(long, default_value = "latency")]
    pub sort: SortOrder,

    /// Do not show the progress indicator
    #[arg(long)]
    pub no_progress: bool,
}

impl RunArgs {
    /// Per-lookup timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolver selected on the command line.
    #[must_use]
    pub fn mode(&self) -> ResolverMode {
        if self.system_resolver {
            ResolverMode::System
        } else {
            ResolverMode::Provider
        }
    }
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            source: SourceArgs::default(),
            count: defaults::DEFAULT_REPETITIONS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            system_resolver: false,
            sort: SortOrder::default(),
            no_progress: false,
        }
    }
}

/// Available commands for the dnslatency CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Measure DNS providers (default)
    ///
    /// Resolve every domain `--count` times through each provider and
    /// print the average lookup time per provider.
    #[command(alias = "r")]
    Run(RunArgs),

    /// List the configured providers and domains
    #[command(alias = "l")]
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Show only IPv4 providers
        #[arg(long = "ipv4", conflicts_with = "ipv6_only")]
        ipv4_only: bool,

        /// Show only IPv6 providers
        #[arg(long = "ipv6")]
        ipv6_only: bool,
    },

    /// Export the configured provider list
    ///
    /// Write the merged provider and domain lists to a JSON file that can
    /// be passed back with `--file`.
    #[command(alias = "e")]
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file path
        #[arg(short, long, default_value = "providers.json")]
        output: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Parse CLI arguments and return verbose flag.
///
/// # Returns
///
/// Returns a tuple of `(Cli, verbose)` where `verbose` indicates
/// whether verbose logging was enabled.
#[must_use]
pub fn parse_verbose() -> (Cli, bool) {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    (cli, verbose)
}
