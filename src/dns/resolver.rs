//! Hostname lookup backends.
//!
//! The worker only sees the [`Lookup`] trait. Two real backends exist:
//! one resolver per provider address ([`ProviderLookup`]) and the host's
//! configured resolver shared by everyone ([`SystemLookup`]). Tests plug in
//! their own implementations.

#![allow(clippy::missing_errors_doc)]

use crate::dns::types::Provider;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::TokioAsyncResolver;

/// Standard DNS port.
const DNS_PORT: u16 = 53;

/// Error returned by a single lookup.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Resolver failure (NXDOMAIN, refused, network unreachable, timeout)
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// No resolver is configured for the provider
    #[error("no resolver for {0}")]
    UnknownProvider(String),

    /// Free-form failure reported by a lookup backend
    #[error("{0}")]
    Other(String),
}

impl LookupError {
    /// Create a free-form lookup error.
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Check if the resolver itself gave up because of a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Resolve(e) => matches!(e.kind(), ResolveErrorKind::Timeout),
            _ => false,
        }
    }
}

/// A hostname resolution backend.
///
/// Implementations resolve `domain` on behalf of `provider` and return the
/// number of addresses found. They must not apply their own retry policy;
/// the worker bounds every call with its timeout.
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn lookup(
        &self,
        provider: &Provider,
        domain: &str,
    ) -> std::result::Result<usize, LookupError>;
}

/// Which resolver answers the lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverMode {
    /// Query each provider's own address
    #[default]
    Provider,
    /// Query the host's configured resolver; provider addresses are display-only
    System,
}

impl fmt::Display for ResolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider => write!(f, "provider"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Build the lookup backend for a run.
///
/// Every resolver is created up front so that an unusable provider address
/// or system configuration fails the run before anything is dispatched.
pub fn build_lookup(
    mode: ResolverMode,
    providers: &[Provider],
    timeout: Duration,
) -> Result<Arc<dyn Lookup>> {
    match mode {
        ResolverMode::Provider => Ok(Arc::new(ProviderLookup::new(providers, timeout)?)),
        ResolverMode::System => Ok(Arc::new(SystemLookup::new(timeout)?)),
    }
}

/// Resolver options for latency measurement: one attempt, no cache.
fn measurement_opts(mut opts: ResolverOpts, timeout: Duration) -> ResolverOpts {
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.cache_size = 0;
    opts.use_hosts_file = false;
    opts
}

/// Append the root label so search domains never apply.
fn fqdn(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{domain}.")
    }
}

async fn resolve_with(
    resolver: &TokioAsyncResolver,
    domain: &str,
) -> std::result::Result<usize, LookupError> {
    let response = resolver.lookup_ip(fqdn(domain)).await?;
    Ok(response.iter().count())
}

/// One resolver per provider, each talking only to that provider's address.
pub struct ProviderLookup {
    resolvers: HashMap<Provider, TokioAsyncResolver>,
}

impl ProviderLookup {
    /// Create a resolver for every provider.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider address is not an IP address or a
    /// resolver cannot be initialized.
    pub fn new(providers: &[Provider], timeout: Duration) -> Result<Self> {
        let mut resolvers = HashMap::with_capacity(providers.len());
        for provider in providers {
            let ip: IpAddr = provider.ip_addr().ok_or_else(|| {
                Error::parse(format!("Invalid IP address for {}: {}", provider.name, provider.ip))
            })?;

            let config = ResolverConfig::from_parts(
                None,
                vec![],
                NameServerConfigGroup::from_ips_clear(&[ip], DNS_PORT, true),
            );
            let opts = measurement_opts(ResolverOpts::default(), timeout);
            let resolver = TokioAsyncResolver::tokio(config, opts).map_err(Error::Resolver)?;

            tracing::debug!("resolver ready for {provider}");
            resolvers.insert(provider.clone(), resolver);
        }
        Ok(Self { resolvers })
    }
}

#[async_trait]
impl Lookup for ProviderLookup {
    async fn lookup(
        &self,
        provider: &Provider,
        domain: &str,
    ) -> std::result::Result<usize, LookupError> {
        let resolver = self
            .resolvers
            .get(provider)
            .ok_or_else(|| LookupError::UnknownProvider(provider.to_string()))?;
        resolve_with(resolver, domain).await
    }
}

/// The host's configured resolver, shared by every provider.
pub struct SystemLookup {
    resolver: TokioAsyncResolver,
}

impl SystemLookup {
    /// Create a resolver from the system configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the system configuration cannot be read.
    pub fn new(timeout: Duration) -> Result<Self> {
        let (config, opts) = trust_dns_resolver::system_conf::read_system_conf()?;
        let resolver = TokioAsyncResolver::tokio(config, measurement_opts(opts, timeout))
            .map_err(Error::Resolver)?;
        Ok(Self { resolver })
    }
}

#[async_trait]
impl Lookup for SystemLookup {
    async fn lookup(
        &self,
        _provider: &Provider,
        domain: &str,
    ) -> std::result::Result<usize, LookupError> {
        resolve_with(&self.resolver, domain).await
    }
}
