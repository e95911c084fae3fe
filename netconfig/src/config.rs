//! Runtime configuration read from environment variables.

use netconfig_data::chart::{ChartConfig, DEFAULT_CHART_URL, DEFAULT_SEARCH_URL};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "network_interfaces.json";
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Session configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry file (NETCONFIG_FILE)
    pub config_file: PathBuf,
    /// Live monitor refresh interval (NETCONFIG_REFRESH_SECS)
    pub refresh_interval: Duration,
    /// Chart endpoint (NETCONFIG_CHART_URL)
    pub chart_url: String,
    /// Search endpoint (NETCONFIG_SEARCH_URL)
    pub search_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            chart_url: DEFAULT_CHART_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults for missing or
    /// unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config_file = lookup("NETCONFIG_FILE")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.config_file);

        let refresh_interval = match lookup("NETCONFIG_REFRESH_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "invalid NETCONFIG_REFRESH_SECS, using {}s", DEFAULT_REFRESH_SECS);
                    defaults.refresh_interval
                }
            },
            None => defaults.refresh_interval,
        };

        Self {
            config_file,
            refresh_interval,
            chart_url: lookup("NETCONFIG_CHART_URL").unwrap_or(defaults.chart_url),
            search_url: lookup("NETCONFIG_SEARCH_URL").unwrap_or(defaults.search_url),
        }
    }

    pub fn chart_config(&self) -> ChartConfig {
        ChartConfig::default()
            .with_chart_url(self.chart_url.clone())
            .with_search_url(self.search_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.config_file, PathBuf::from("network_interfaces.json"));
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.chart_url, DEFAULT_CHART_URL);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("NETCONFIG_FILE", "/etc/netconfig/ifaces.json"),
            ("NETCONFIG_REFRESH_SECS", "5"),
            ("NETCONFIG_CHART_URL", "http://127.0.0.1:8080/chart/"),
        ]));
        assert_eq!(config.config_file, PathBuf::from("/etc/netconfig/ifaces.json"));
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.chart_config().chart_url, "http://127.0.0.1:8080/chart/");
        assert_eq!(config.search_url, DEFAULT_SEARCH_URL);
    }

    #[test]
    fn test_config_invalid_refresh_falls_back() {
        for raw in ["0", "soon", "-3"] {
            let config = Config::from_lookup(lookup(&[("NETCONFIG_REFRESH_SECS", raw)]));
            assert_eq!(config.refresh_interval, Duration::from_secs(30), "{}", raw);
        }
    }
}
