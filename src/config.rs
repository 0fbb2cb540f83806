//! Runtime settings read from the environment (after `.env` is loaded).

use std::time::Duration;

use thiserror::Error;

use crate::widgets::GeneratorLimits;

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    /// Also bounds how many widget generators run at once.
    pub db_max_connections: u32,
    pub request_timeout: Duration,
    /// S3 bucket holding precomputed widgets, if caching is enabled.
    pub cache_bucket: Option<String>,
    pub cache_gzip: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`; unset and empty variables are treated
    /// alike.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => parse_positive("DB_MAX_CONNECTIONS", &raw)?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let timeout_secs = match get("INFOGRAPHICS_REQUEST_TIMEOUT_SECS") {
            Some(raw) => parse_positive("INFOGRAPHICS_REQUEST_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let cache_gzip = match get("INFOGRAPHICS_CACHE_GZIP") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "INFOGRAPHICS_CACHE_GZIP",
                        value: raw,
                    });
                }
            },
            None => false,
        };

        Ok(Self {
            database_url,
            db_max_connections,
            request_timeout: Duration::from_secs(timeout_secs),
            cache_bucket: get("INFOGRAPHICS_CACHE_BUCKET"),
            cache_gzip,
        })
    }

    pub fn generator_limits(&self) -> GeneratorLimits {
        GeneratorLimits {
            max_concurrency: self.db_max_connections as usize,
            timeout: self.request_timeout,
        }
    }
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
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
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/anyway")]))
            .unwrap();
        assert_eq!(settings.db_max_connections, 5);
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.cache_bucket, None);
        assert!(!settings.cache_gzip);
        assert_eq!(settings.generator_limits(), GeneratorLimits::default());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/anyway"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("INFOGRAPHICS_REQUEST_TIMEOUT_SECS", "90"),
            ("INFOGRAPHICS_CACHE_BUCKET", "infographics-cache"),
            ("INFOGRAPHICS_CACHE_GZIP", "true"),
        ]))
        .unwrap();
        assert_eq!(settings.generator_limits().max_concurrency, 12);
        assert_eq!(settings.request_timeout, Duration::from_secs(90));
        assert_eq!(settings.cache_bucket.as_deref(), Some("infographics-cache"));
        assert!(settings.cache_gzip);
    }

    #[test]
    fn test_missing_database_url() {
        assert_eq!(
            Settings::from_lookup(lookup(&[("DATABASE_URL", "  ")])),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (name, value) in [
            ("DB_MAX_CONNECTIONS", "0"),
            ("DB_MAX_CONNECTIONS", "many"),
            ("INFOGRAPHICS_REQUEST_TIMEOUT_SECS", "-1"),
            ("INFOGRAPHICS_CACHE_GZIP", "maybe"),
        ] {
            let result = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://db"), (name, value)]));
            assert!(
                matches!(result, Err(ConfigError::Invalid { name: n, .. }) if n == name),
                "{name}={value}"
            );
        }
    }
}
