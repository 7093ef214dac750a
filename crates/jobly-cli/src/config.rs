use crate::cli::ConnArgs;
use serde::Deserialize;
use std::path::Path;

/// Optional `jobly.toml` layered over the environment.
///
/// ```toml
/// [database]
/// url = "postgres://${PGUSER}@localhost/jobly"
/// pool_size = 8
///
/// [auth]
/// secret_key = "${JOBLY_SECRET}"
/// token_ttl_secs = 900
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub secret_key: Option<String>,
    pub token_ttl_secs: Option<u64>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        Self::parse(&raw, |key| std::env::var(key).ok())
            .map_err(|e| anyhow::anyhow!("failed to load config file {}: {e}", path.display()))
    }

    fn parse(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env(&lookup)?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = self.database.url.as_mut() {
            *url = expand_env_vars(url, lookup)?;
        }
        if let Some(secret) = self.auth.secret_key.as_mut() {
            *secret = expand_env_vars(secret, lookup)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            anyhow::bail!("database.url must not be empty");
        }
        if self.database.pool_size == Some(0) {
            anyhow::bail!("database.pool_size must be at least 1");
        }
        if self.auth.secret_key.as_deref().is_some_and(|s| s.is_empty()) {
            anyhow::bail!("auth.secret_key must not be empty");
        }
        Ok(())
    }

    fn apply(self, config: &mut jobly::Config) {
        if let Some(url) = self.database.url {
            config.database_url = url;
        }
        if let Some(size) = self.database.pool_size {
            config.pool_size = size;
        }
        if let Some(secret) = self.auth.secret_key {
            config.secret_key = secret;
        }
        if let Some(ttl) = self.auth.token_ttl_secs {
            config.token_ttl_secs = ttl;
        }
    }
}

/// Environment, then the config file, then `--database`.
pub fn resolve(conn: &ConnArgs) -> anyhow::Result<jobly::Config> {
    let mut config = jobly::Config::from_env()?;
    if let Some(path) = &conn.config {
        ConfigFile::load(path)?.apply(&mut config);
    }
    if let Some(url) = &conn.database {
        config.database_url = url.clone();
    }
    tracing::debug!(
        target: "jobly.cli",
        pool_size = config.pool_size,
        token_ttl_secs = config.token_ttl_secs,
        "settings resolved"
    );
    Ok(config)
}

fn expand_env_vars(
    input: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}}}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = lookup(&key)
                .ok_or_else(|| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(key: &str) -> Option<String> {
        match key {
            "PGUSER" => Some("jobs".to_string()),
            "JOBLY_SECRET" => Some("hunter2".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_variables() {
        assert_eq!(
            expand_env_vars("postgres://${PGUSER}@db/jobly", &env).unwrap(),
            "postgres://jobs@db/jobly"
        );
        assert_eq!(expand_env_vars("cost: $5", &env).unwrap(), "cost: $5");
    }

    #[test]
    fn rejects_bad_references() {
        assert!(expand_env_vars("${PGUSER", &env).is_err());
        assert!(expand_env_vars("${}", &env).is_err());
        assert!(expand_env_vars("${NOPE}", &env).is_err());
    }

    #[test]
    fn file_values_override_environment() {
        let file = ConfigFile::parse(
            r#"
[database]
url = "postgres://${PGUSER}@db/jobly"
pool_size = 4

[auth]
secret_key = "${JOBLY_SECRET}"
"#,
            env,
        )
        .unwrap();

        let mut config = jobly::Config::default();
        file.apply(&mut config);
        assert_eq!(config.database_url, "postgres://jobs@db/jobly");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.secret_key, "hunter2");
        assert_eq!(config.token_ttl_secs, 3600);
    }

    #[test]
    fn empty_file_changes_nothing() {
        let file = ConfigFile::parse("", env).unwrap();
        let mut config = jobly::Config::default();
        file.apply(&mut config);
        assert_eq!(config, jobly::Config::default());
    }

    #[test]
    fn invalid_files_are_rejected() {
        assert!(ConfigFile::parse("[database]\npool_size = 0\n", env).is_err());
        assert!(ConfigFile::parse("[database]\nurl = \"\"\n", env).is_err());
        assert!(ConfigFile::parse("[server]\nport = 1\n", env).is_err());
    }
}
