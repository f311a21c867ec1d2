//! Runtime configuration, read from the environment with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::install_check::default_cache_ttl;

/// Route shown when Ollama is missing.
pub const FALLBACK_ROUTE: &str = "/noOllama";

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_OLLAMA_BINARY: &str = "ollama";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where persisted key-value entries live
    pub config_dir: PathBuf,
    /// Upper bound on a single installation probe
    pub probe_timeout: Duration,
    /// Binary name or path used by the probe
    pub ollama_binary: String,
    /// No storage or presentation target; every operation no-ops
    pub headless: bool,
    pub fallback_route: String,
    pub cache_ttl: chrono::Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            ollama_binary: DEFAULT_OLLAMA_BINARY.into(),
            headless: false,
            fallback_route: FALLBACK_ROUTE.into(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("CHARLES_CONFIG_DIR").filter(|d| !d.trim().is_empty()) {
            config.config_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup("CHARLES_PROBE_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.probe_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    "Ignoring CHARLES_PROBE_TIMEOUT_SECS={:?}, using {}s",
                    raw,
                    DEFAULT_PROBE_TIMEOUT_SECS
                ),
            }
        }

        if let Some(bin) = lookup("CHARLES_OLLAMA_BIN").filter(|b| !b.trim().is_empty()) {
            config.ollama_binary = bin;
        }

        if let Some(val) = lookup("CHARLES_HEADLESS") {
            config.headless = is_truthy(&val);
        }

        config
    }
}

fn is_truthy(val: &str) -> bool {
    let v = val.trim().to_ascii_lowercase();
    v == "1" || v == "true" || v == "yes"
}

fn default_config_dir() -> PathBuf {
    directories::ProjectDirs::from("com.local", "Charles", "Charles")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./charles-data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.probe_timeout, Duration::from_secs(10));
        assert_eq!(config.ollama_binary, "ollama");
        assert_eq!(config.fallback_route, "/noOllama");
        assert_eq!(config.cache_ttl, chrono::Duration::hours(24));
        assert!(!config.headless);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CHARLES_CONFIG_DIR", "/tmp/charles"),
            ("CHARLES_PROBE_TIMEOUT_SECS", "3"),
            ("CHARLES_OLLAMA_BIN", "/opt/ollama/bin/ollama"),
            ("CHARLES_HEADLESS", "Yes"),
        ]));
        assert_eq!(config.config_dir, PathBuf::from("/tmp/charles"));
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.ollama_binary, "/opt/ollama/bin/ollama");
        assert!(config.headless);
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let config = AppConfig::from_lookup(lookup_from(&[("CHARLES_PROBE_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.probe_timeout, Duration::from_secs(10));

        let config = AppConfig::from_lookup(lookup_from(&[("CHARLES_PROBE_TIMEOUT_SECS", "0")]));
        assert_eq!(config.probe_timeout, Duration::from_secs(10));
    }
}
