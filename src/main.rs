//! dnslatency - DNS resolution latency benchmark
//!
//! Binary entry point for the dnslatency CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use clap::CommandFactory;
use dnslatency::cli::{Cli, Commands, OutputFormat, RunArgs, SourceArgs};
use dnslatency::config::{ConfigLoader, MeasureConfig, ProviderList};
use dnslatency::dns::{build_lookup, dispatch, NoProgress, ProgressObserver};
use dnslatency::error::Result;
use dnslatency::progress::TerminalProgress;
use dnslatency::report::{self, Report};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up logging based on verbosity level.
///
/// Logs go to stderr so stdout only carries the report.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

/// Load the provider and domain lists.
fn load_sources(source: &SourceArgs) -> Result<ProviderList> {
    ConfigLoader::resolve(
        source.file.as_deref(),
        source.dns_servers.clone(),
        source.domains.clone(),
    )
}

/// Measure every provider and print the report.
async fn run_measurement(args: RunArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let list = load_sources(&args.source)?;

    let mut config = MeasureConfig::new(list);
    config.repetitions = args.count;
    config.timeout = args.timeout();
    config.mode = args.mode();
    config.validate()?;

    tracing::info!(
        "measuring {} providers over {} domains ({} lookups each, {:?} timeout, {} resolver)",
        config.providers.len(),
        config.domains.len(),
        config.repetitions,
        config.timeout,
        config.mode
    );

    let lookup = build_lookup(config.mode, &config.providers, config.timeout)?;

    let observer: Arc<dyn ProgressObserver> =
        if quiet || args.no_progress || format != OutputFormat::Table {
            Arc::new(NoProgress)
        } else {
            Arc::new(TerminalProgress::new())
        };

    let run = dispatch(&config.providers, &config.plan(), lookup, observer);
    let results = report::collect(run).await;

    let report = Report::new(
        results,
        args.sort,
        config.mode,
        config.repetitions,
        config.domains,
    );
    tracing::info!(
        "{} of {} providers answered ({:.0}%)",
        report.summary.success,
        report.summary.total,
        report.summary.success_rate()
    );

    let mut out = std::io::stdout().lock();
    report.write(&mut out, format)?;
    out.flush()?;
    Ok(())
}

/// List providers with optional filtering.
fn run_list(
    source: &SourceArgs,
    ipv4_only: bool,
    ipv6_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut list = load_sources(source)?;
    list.providers
        .retain(|p| (!ipv4_only || p.is_ipv4()) && (!ipv6_only || p.is_ipv6()));

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("DNS providers ({}):\n", list.providers.len());
    println!("{:<4} {:<20} {:<20}", "#", "Name", "IP");
    println!("{}", "-".repeat(46));
    for (idx, p) in list.providers.iter().enumerate() {
        println!("{:<4} {:<20} {:<20}", idx + 1, p.name, p.ip);
    }

    println!("\nDomains ({}):", list.domains.len());
    for domain in &list.domains {
        println!("  {domain}");
    }
    Ok(())
}

/// Export the resolved provider list as JSON.
fn run_export(source: &SourceArgs, output: PathBuf) -> Result<()> {
    let list = load_sources(source)?;
    let json = serde_json::to_string_pretty(&list)?;
    std::fs::write(&output, json)?;
    tracing::info!(
        "exported {} providers to {}",
        list.providers.len(),
        output.display()
    );
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run(args)) => run_measurement(args, cli.format, cli.quiet).await,
        Some(Commands::List {
            source,
            ipv4_only,
            ipv6_only,
        }) => run_list(&source, ipv4_only, ipv6_only, cli.format),
        Some(Commands::Export { source, output }) => run_export(&source, output),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "dnslatency",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        None => run_measurement(RunArgs::default(), cli.format, cli.quiet).await,
    }
}

/// Main entry point for the dnslatency CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (cli, verbose) = dnslatency::cli::parse_verbose();
    setup_logging(verbose, cli.quiet);

    tracing::debug!("dnslatency starting...");

    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    Ok(())
}
