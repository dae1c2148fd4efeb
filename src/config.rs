// ==============================================================================
// config.rs - Service Configuration
// ==============================================================================
// Description: Environment-driven settings for the API gateway
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";
// 1000 requests per 15 minutes per client
const DEFAULT_RATE_LIMIT_MAX: u32 = 1000;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024; // 1 MiB

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("Unknown log format: {} (expected compact or json)", other),
        }
    }
}

/// Runtime settings
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    pub body_limit_bytes: usize,
    /// Extra static tokens, `token:id:email:name;...`
    pub auth_tokens: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origins: vec![DEFAULT_CORS_ORIGINS.to_string()],
            log_format: LogFormat::Compact,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            auth_tokens: None,
        }
    }
}

impl Config {
    /// Reads settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cors_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.cors_origins,
        };

        let rate_limit_window = parse_var(&lookup, "RATE_LIMIT_WINDOW_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.rate_limit_window);

        Ok(Self {
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            cors_origins,
            log_format: parse_var(&lookup, "LOG_FORMAT")?.unwrap_or(defaults.log_format),
            rate_limit_max: parse_var(&lookup, "RATE_LIMIT_MAX")?.unwrap_or(defaults.rate_limit_max),
            rate_limit_window,
            body_limit_bytes: parse_var(&lookup, "BODY_LIMIT_BYTES")?
                .unwrap_or(defaults.body_limit_bytes),
            auth_tokens: lookup("AUTH_TOKENS").filter(|s| !s.trim().is_empty()),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.rate_limit_max, 1000);
        assert_eq!(config.rate_limit_window, Duration::from_secs(900));
        assert!(config.auth_tokens.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example.com, https://b.example.com"),
            ("LOG_FORMAT", "JSON"),
            ("RATE_LIMIT_MAX", "10"),
            ("RATE_LIMIT_WINDOW_SECS", "60"),
            ("AUTH_TOKENS", "t:u:e@example.com:N"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.rate_limit_max, 10);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.auth_tokens.as_deref(), Some("t:u:e@example.com:N"));
    }

    #[test]
    fn test_malformed_values_are_errors() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        assert!(Config::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).is_err());
    }
}
