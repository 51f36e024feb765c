use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use risk_loader::{DataSource, DEFAULT_FETCH_TIMEOUT};
use thiserror::Error;

pub const DEFAULT_CSV_PATH: &str = "data/doc_risk_scores_k7.csv";
pub const DEFAULT_PORT: u16 = 8050;
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub source: DataSource,
    pub host: IpAddr,
    pub port: u16,
    pub fetch_timeout: Duration,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = match get("CSV_URL") {
            Some(url) => DataSource::Remote(url.trim().to_string()),
            None => DataSource::Local(PathBuf::from(
                get("CSV_PATH").unwrap_or_else(|| DEFAULT_CSV_PATH.to_string()),
            )),
        };

        let host: IpAddr = parse_var("HOST", get("HOST"), DEFAULT_HOST.parse().ok())?;
        let port: u16 = parse_var("PORT", get("PORT"), Some(DEFAULT_PORT))?;
        let fetch_timeout = parse_var::<u64>(
            "FETCH_TIMEOUT_SECS",
            get("FETCH_TIMEOUT_SECS"),
            Some(DEFAULT_FETCH_TIMEOUT.as_secs()),
        )
        .map(Duration::from_secs)?;

        Ok(Self {
            source,
            host,
            port,
            fetch_timeout,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T>(var: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match (raw, default) {
        (Some(value), _) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
        (None, Some(default)) => Ok(default),
        (None, None) => Err(ConfigError::Invalid {
            var,
            value: String::new(),
            reason: "no value and no default".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.source, DataSource::Local(PathBuf::from(DEFAULT_CSV_PATH)));
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8050");
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_remote_source_wins_over_path() {
        let config = config(&[
            ("CSV_URL", " https://example.com/scores.csv "),
            ("CSV_PATH", "other.csv"),
        ])
        .unwrap();
        assert_eq!(
            config.source,
            DataSource::Remote("https://example.com/scores.csv".to_string())
        );
    }

    #[test]
    fn test_blank_url_falls_back_to_path() {
        let config = config(&[("CSV_URL", "  "), ("CSV_PATH", "scores.csv")]).unwrap();
        assert_eq!(config.source, DataSource::Local(PathBuf::from("scores.csv")));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("FETCH_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PORT"));
        assert!(message.contains("eighty"));
    }
}
