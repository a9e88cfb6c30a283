use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::generation::bridge::BridgeLimits;

/// Application configuration loaded from environment variables.
/// Fails at startup if a set variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// The single browser origin allowed by CORS.
    pub allowed_origin: String,
    pub worker_program: String,
    pub worker_args: Vec<String>,
    pub worker_dir: Option<PathBuf>,
    pub worker_timeout: Duration,
    pub max_concurrent_workers: usize,
    pub max_artifact_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            allowed_origin: std::env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            worker_program: std::env::var("WORKER_PROGRAM").unwrap_or_else(|_| "python".to_string()),
            worker_args: split_args(
                &std::env::var("WORKER_ARGS").unwrap_or_else(|_| "server.py".to_string()),
            ),
            worker_dir: std::env::var("WORKER_DIR").ok().map(PathBuf::from),
            worker_timeout: Duration::from_secs(parse_env("WORKER_TIMEOUT_SECS", 120)?),
            max_concurrent_workers: parse_env("MAX_CONCURRENT_WORKERS", 4)?,
            max_artifact_bytes: parse_env("MAX_ARTIFACT_BYTES", 25 * 1024 * 1024)?,
        })
    }

    pub fn bridge_limits(&self) -> BridgeLimits {
        BridgeLimits {
            timeout: self.worker_timeout,
            max_concurrent_workers: self.max_concurrent_workers,
            max_artifact_bytes: self.max_artifact_bytes,
            ..BridgeLimits::default()
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            allowed_origin: "http://localhost:5173".to_string(),
            worker_program: "sh".to_string(),
            worker_args: vec![],
            worker_dir: None,
            worker_timeout: Duration::from_secs(5),
            max_concurrent_workers: 4,
            max_artifact_bytes: 1024 * 1024,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args_ignores_extra_whitespace() {
        assert_eq!(split_args("  server.py   --quiet "), vec!["server.py", "--quiet"]);
        assert!(split_args("").is_empty());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("DOCBRIDGE_TEST_UNSET_PORT", 5000).unwrap();
        assert_eq!(value, 5000);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("DOCBRIDGE_TEST_BAD_TIMEOUT", "soon");
        let err = parse_env::<u64>("DOCBRIDGE_TEST_BAD_TIMEOUT", 1).unwrap_err();
        assert!(err.to_string().contains("DOCBRIDGE_TEST_BAD_TIMEOUT"));
    }

    #[test]
    fn test_bridge_limits_follow_config() {
        let limits = Config::for_tests().bridge_limits();
        assert_eq!(limits.timeout, Duration::from_secs(5));
        assert_eq!(limits.max_artifact_bytes, 1024 * 1024);
        assert_eq!(limits.max_diagnostic_bytes, BridgeLimits::default().max_diagnostic_bytes);
    }
}
