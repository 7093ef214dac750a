//! Runtime settings read from the environment.
//!
//! A `.env` file in the working directory (or any parent) is loaded first when present;
//! variables already set in the process environment win over it.

use crate::error::{JoblyError, JoblyResult};
use std::str::FromStr;

const DEFAULT_DATABASE_URL: &str = "postgresql:///jobly";
const TEST_DATABASE_URL: &str = "postgresql:///jobly_test";
const DEFAULT_SECRET_KEY: &str = "secret-dev";
const DEFAULT_POOL_SIZE: usize = 16;
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Connection and signing settings shared by the library and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub pool_size: usize,
    pub token_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl Config {
    /// Load from `.env` and the process environment.
    ///
    /// - `DATABASE_URL`: default `postgresql:///jobly`, or `postgresql:///jobly_test` when
    ///   `JOBLY_ENV=test`
    /// - `SECRET_KEY`: default `secret-dev`
    /// - `JOBLY_POOL_SIZE`: default `16`
    /// - `JOBLY_TOKEN_TTL_SECS`: default `3600`
    pub fn from_env() -> JoblyResult<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(JoblyError::Config(format!("failed to load .env: {err}")));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None if get("JOBLY_ENV").as_deref() == Some("test") => TEST_DATABASE_URL.to_string(),
            None => DEFAULT_DATABASE_URL.to_string(),
        };

        let pool_size = parse_or(get("JOBLY_POOL_SIZE"), "JOBLY_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(JoblyError::Config("JOBLY_POOL_SIZE must be at least 1".into()));
        }

        Ok(Self {
            database_url,
            secret_key: get("SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string()),
            pool_size,
            token_ttl_secs: parse_or(
                get("JOBLY_TOKEN_TTL_SECS"),
                "JOBLY_TOKEN_TTL_SECS",
                DEFAULT_TOKEN_TTL_SECS,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> JoblyResult<T>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| JoblyError::Config(format!("invalid {key} value {v:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_switches_database() {
        let config = Config::from_lookup(lookup(&[("JOBLY_ENV", "test")])).unwrap();
        assert_eq!(config.database_url, "postgresql:///jobly_test");

        let config = Config::from_lookup(lookup(&[
            ("JOBLY_ENV", "test"),
            ("DATABASE_URL", "postgres://db/other"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "postgres://db/other");
    }

    #[test]
    fn explicit_values_are_used() {
        let config = Config::from_lookup(lookup(&[
            ("SECRET_KEY", "s3cret"),
            ("JOBLY_POOL_SIZE", " 4 "),
            ("JOBLY_TOKEN_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.secret_key, "s3cret");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.token_ttl_secs, 60);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[("SECRET_KEY", ""), ("DATABASE_URL", "  ")]))
            .unwrap();
        assert_eq!(config.secret_key, "secret-dev");
        assert_eq!(config.database_url, "postgresql:///jobly");
    }

    #[test]
    fn malformed_numbers_are_config_errors() {
        let err = Config::from_lookup(lookup(&[("JOBLY_POOL_SIZE", "many")])).unwrap_err();
        assert!(matches!(err, JoblyError::Config(ref m) if m.contains("JOBLY_POOL_SIZE")));

        let err = Config::from_lookup(lookup(&[("JOBLY_POOL_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, JoblyError::Config(_)));

        let err = Config::from_lookup(lookup(&[("JOBLY_TOKEN_TTL_SECS", "-1")])).unwrap_err();
        assert!(matches!(err, JoblyError::Config(_)));
    }
}
