//! Provider list configuration loader.
//!
//! This module loads provider and domain lists from JSON files,
//! command-line arguments, the user config directory or the built-in
//! defaults, and validates the measurement settings.

use crate::config::defaults;
use crate::dns::dispatcher::Plan;
use crate::dns::resolver::ResolverMode;
use crate::dns::types::Provider;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the user provider list inside the config directory.
const USER_LIST_FILE: &str = "providers.json";

/// Providers and domains for one run.
///
/// This is also the on-disk JSON format:
///
/// ```json
/// { "providers": [{ "name": "Cloudflare", "ip": "1.1.1.1" }], "domains": ["github.com"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderList {
    /// Providers to measure
    pub providers: Vec<Provider>,
    /// Hostnames to resolve; empty means "use the defaults"
    #[serde(default)]
    pub domains: Vec<String>,
}

/// Validated settings for a measurement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureConfig {
    /// Providers to measure
    pub providers: Vec<Provider>,
    /// Hostnames to resolve
    pub domains: Vec<String>,
    /// Lookups per domain
    pub repetitions: usize,
    /// Budget for a single lookup
    pub timeout: Duration,
    /// Which resolver answers the lookups
    pub mode: ResolverMode,
}

impl MeasureConfig {
    /// Create a config with the default repetition count, timeout and mode.
    #[must_use]
    pub fn new(list: ProviderList) -> Self {
        Self {
            providers: list.providers,
            domains: list.domains,
            repetitions: defaults::DEFAULT_REPETITIONS,
            timeout: defaults::DEFAULT_TIMEOUT,
            mode: ResolverMode::default(),
        }
    }

    /// Check the settings before anything is dispatched.
    ///
    /// # Errors
    ///
    /// Returns an error if the repetition count or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.repetitions == 0 {
            return Err(Error::config("repetition count must be at least 1"));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("lookup timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Worker parameters shared by every provider.
    #[must_use]
    pub fn plan(&self) -> Plan {
        Plan {
            domains: self.domains.clone(),
            repetitions: self.repetitions,
            timeout: self.timeout,
        }
    }
}

/// Provider list configuration loader.
///
/// Provides various methods to load and merge provider lists
/// from different sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a provider list from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let list = ConfigLoader::load_from_file("providers.json")?;
    /// for provider in &list.providers {
    ///     println!("{}: {}", provider.name, provider.ip);
    /// }
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ProviderList> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let list: ProviderList = serde_json::from_str(&content)?;
        Ok(list)
    }

    /// Load the user provider list, if there is one.
    ///
    /// Looks for `$CONFIG_DIR/dnslatency/providers.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_user() -> Result<Option<ProviderList>> {
        let path = Self::config_dir().join(USER_LIST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        tracing::debug!("loading user provider list from {}", path.display());
        Self::load_from_file(path).map(Some)
    }

    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dnslatency")
    }

    /// Resolve the provider and domain lists for a run.
    ///
    /// Providers come from, in order of preference: `dns_args`, `file`,
    /// the user provider list, the built-in list. Domains come from
    /// `domain_args`, then the chosen file's `domains`, then the built-in
    /// list. Duplicate `(name, ip)` pairs are removed; domains are kept as
    /// given, repeats included.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested source cannot be loaded
    /// or an argument is malformed.
    pub fn resolve(
        file: Option<&Path>,
        dns_args: Vec<String>,
        domain_args: Vec<String>,
    ) -> Result<ProviderList> {
        let file_list = match file {
            Some(path) => Some(Self::load_from_file(path)?),
            None => Self::load_user()?,
        };

        let providers = if dns_args.is_empty() {
            file_list
                .as_ref()
                .map(|l| l.providers.clone())
                .unwrap_or_else(defaults::providers)
        } else {
            Self::from_args(dns_args)?.providers
        };

        let domains = if !domain_args.is_empty() {
            Self::domains_from_args(domain_args)?
        } else {
            match file_list {
                Some(list) if !list.domains.is_empty() => list.domains,
                _ => defaults::domains(),
            }
        };

        Ok(Self::merge(vec![ProviderList { providers, domains }]))
    }

    /// Merge multiple provider lists into one.
    ///
    /// Keeps the first occurrence of every `(name, ip)` pair, preserving
    /// order. Domain lists are concatenated unchanged.
    #[must_use]
    pub fn merge(lists: Vec<ProviderList>) -> ProviderList {
        let mut seen_providers = HashSet::new();
        let mut merged = ProviderList::default();

        for list in lists {
            for provider in list.providers {
                if seen_providers.insert(provider.clone()) {
                    merged.providers.push(provider);
                }
            }
            merged.domains.extend(list.domains);
        }
        merged
    }

    /// Create a provider list from command-line arguments.
    ///
    /// # Arguments
    ///
    /// * `dns_servers` - Vector of strings in format "IP#Name"
    ///
    /// # Errors
    ///
    /// Returns an error if any IP address is invalid.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let args = vec!["8.8.8.8#Google".to_string(), "1.1.1.1#Cloudflare".to_string()];
    /// let list = ConfigLoader::from_args(args)?;
    /// ```
    pub fn from_args(dns_servers: Vec<String>) -> Result<ProviderList> {
        let mut providers = Vec::new();
        for s in dns_servers {
            let (ip, name) = match s.split_once('#') {
                Some((ip, name)) => (ip.trim().to_string(), name.trim().to_string()),
                None => (s.trim().to_string(), s.trim().to_string()),
            };

            if ip.parse::<std::net::IpAddr>().is_err() {
                return Err(Error::parse(format!("Invalid IP address: {ip}")));
            }

            providers.push(Provider::new(name, ip));
        }
        Ok(ProviderList {
            providers,
            domains: vec![],
        })
    }

    /// Validate hostnames given on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if a hostname is empty or contains whitespace.
    pub fn domains_from_args(domains: Vec<String>) -> Result<Vec<String>> {
        domains
            .into_iter()
            .map(|d| {
                let d = d.trim().to_string();
                if d.is_empty() || d.contains(char::is_whitespace) {
                    Err(Error::parse(format!("Invalid domain: {d:?}")))
                } else {
                    Ok(d)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_from_args() {
        let args = vec![
            "8.8.8.8#Google".to_string(),
            "1.1.1.1#Cloudflare".to_string(),
            "9.9.9.9".to_string(),
        ];
        let list = ConfigLoader::from_args(args).unwrap();
        assert_eq!(list.providers.len(), 3);
        assert_eq!(list.providers[0].name, "Google");
        assert_eq!(list.providers[1].name, "Cloudflare");
        assert_eq!(list.providers[2], Provider::new("9.9.9.9", "9.9.9.9"));
    }

    #[test]
    fn test_config_from_args_invalid_ip() {
        let args = vec!["invalid_ip#Test".to_string()];
        assert!(matches!(ConfigLoader::from_args(args), Err(Error::Parse(_))));
    }

    #[test]
    fn test_domains_from_args() {
        let domains =
            ConfigLoader::domains_from_args(vec![" github.com ".into(), "rust-lang.org".into()])
                .unwrap();
        assert_eq!(domains, vec!["github.com", "rust-lang.org"]);

        assert!(ConfigLoader::domains_from_args(vec!["".into()]).is_err());
        assert!(ConfigLoader::domains_from_args(vec!["a b.com".into()]).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"providers":[{{"name":"Quad9","ip":"9.9.9.9"}}],"domains":["example.com"]}}"#
        )
        .unwrap();

        let list = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(list.providers, vec![Provider::new("Quad9", "9.9.9.9")]);
        assert_eq!(list.domains, vec!["example.com"]);
    }

    #[test]
    fn test_load_from_file_without_domains() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"providers":[]}}"#).unwrap();
        let list = ConfigLoader::load_from_file(file.path()).unwrap();
        assert!(list.providers.is_empty());
        assert!(list.domains.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::load_from_file(dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let result = ConfigLoader::load_from_file(file.path());
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_resolve_prefers_args() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"providers":[{{"name":"Quad9","ip":"9.9.9.9"}}],"domains":["example.com"]}}"#
        )
        .unwrap();

        let list = ConfigLoader::resolve(
            Some(file.path()),
            vec!["1.1.1.1#Cloudflare".into()],
            vec![],
        )
        .unwrap();
        assert_eq!(list.providers, vec![Provider::new("Cloudflare", "1.1.1.1")]);
        assert_eq!(list.domains, vec!["example.com"]);

        let list =
            ConfigLoader::resolve(Some(file.path()), vec![], vec!["rust-lang.org".into()]).unwrap();
        assert_eq!(list.providers, vec![Provider::new("Quad9", "9.9.9.9")]);
        assert_eq!(list.domains, vec!["rust-lang.org"]);
    }

    #[test]
    fn test_resolve_keeps_repeated_domains() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"providers":[{{"name":"Quad9","ip":"9.9.9.9"}}]}}"#).unwrap();
        let list = ConfigLoader::resolve(
            Some(file.path()),
            vec!["1.1.1.1#Cloudflare".into(), "1.1.1.1#Cloudflare".into()],
            vec!["a.com".into(), "a.com".into()],
        )
        .unwrap();
        assert_eq!(list.providers, vec![Provider::new("Cloudflare", "1.1.1.1")]);
        assert_eq!(list.domains, vec!["a.com", "a.com"]);
    }

    #[test]
    fn test_resolve_file_without_domains_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"providers":[{{"name":"Quad9","ip":"9.9.9.9"}}]}}"#).unwrap();
        let list = ConfigLoader::resolve(Some(file.path()), vec![], vec![]).unwrap();
        assert_eq!(list.domains, defaults::domains());
    }

    #[test]
    fn test_merge_dedups_by_name_and_ip() {
        let a = ProviderList {
            providers: vec![
                Provider::new("Google", "8.8.8.8"),
                Provider::new("Google", "8.8.4.4"),
            ],
            domains: vec!["a.com".into()],
        };
        let b = ProviderList {
            providers: vec![
                Provider::new("Google", "8.8.8.8"),
                Provider::new("Google DNS", "8.8.8.8"),
            ],
            domains: vec!["a.com".into(), "b.com".into()],
        };

        let merged = ConfigLoader::merge(vec![a, b]);
        assert_eq!(
            merged.providers,
            vec![
                Provider::new("Google", "8.8.8.8"),
                Provider::new("Google", "8.8.4.4"),
                Provider::new("Google DNS", "8.8.8.8"),
            ]
        );
        assert_eq!(merged.domains, vec!["a.com", "a.com", "b.com"]);
    }

    #[test]
    fn test_measure_config_validate() {
        let mut config = MeasureConfig::new(defaults::provider_list());
        assert!(config.validate().is_ok());
        assert_eq!(config.repetitions, 5);
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.mode, ResolverMode::Provider);

        let plan = config.plan();
        assert_eq!(plan.domains, config.domains);
        assert_eq!(plan.repetitions, 5);

        config.repetitions = 0;
        assert!(config.validate().is_err());

        config.repetitions = 1;
        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
