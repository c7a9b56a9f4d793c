//! Built-in provider and domain lists.

use crate::config::loader::ProviderList;
use crate::dns::types::Provider;
use std::time::Duration;

/// Default number of lookups per domain.
pub const DEFAULT_REPETITIONS: usize = 5;

/// Default budget for a single lookup.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Well-known public resolvers as `(name, ip)`.
const PROVIDERS: &[(&str, &str)] = &[
    ("Google", "8.8.8.8"),
    ("Google.2", "8.8.4.4"),
    ("Cloudflare", "1.1.1.1"),
    ("Cloudflare.2", "1.0.0.1"),
    ("Quad9", "9.9.9.9"),
    ("Quad9.2", "149.112.112.9"),
    ("OpenDNS", "208.67.222.222"),
    ("OpenDNS.2", "208.67.220.220"),
    ("Level 3", "4.2.2.1"),
    ("Norton ConnectSafe", "199.85.126.10"),
    ("Hurricane Electric", "74.82.42.42"),
    ("CleanBrowsing", "185.228.168.168"),
    ("CleanBrowsing.2", "185.228.169.9"),
    ("Yandex", "77.88.8.8"),
    ("AdGuard", "176.103.130.130"),
    ("AdGuard.2", "176.103.130.131"),
    ("Verisign", "64.6.64.6"),
    ("Verisign.2", "64.6.65.6"),
];

/// Hostnames resolved by default.
const DOMAINS: &[&str] = &["github.com", "google.com", "linkedin.com", "youtube.com"];

/// The built-in provider list.
#[must_use]
pub fn providers() -> Vec<Provider> {
    PROVIDERS
        .iter()
        .map(|(name, ip)| Provider::new(*name, *ip))
        .collect()
}

/// The built-in domain list.
#[must_use]
pub fn domains() -> Vec<String> {
    DOMAINS.iter().map(|d| (*d).to_string()).collect()
}

/// Built-in providers and domains together.
#[must_use]
pub fn provider_list() -> ProviderList {
    ProviderList {
        providers: providers(),
        domains: domains(),
    }
}
