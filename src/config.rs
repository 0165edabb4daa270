use crate::errors::ConfigError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    /// Overrides the database named in the connection string.
    pub mongo_db: Option<String>,
    pub api_key: String,
    pub api_port: u16,
    pub store_timeout: Duration,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Config {
    /// Reads the process environment; `main` loads `.env` into it first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source, so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongo_uri = lookup("MONGO_URI")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("MONGO_URI"))?;

        // an empty key would leave the data routes either open or locked
        let api_key = lookup("API_KEY")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("API_KEY"))?;

        let mongo_db = lookup("MONGO_DB").filter(|v| !v.trim().is_empty());

        let api_port = parse_or(&lookup, "PORT", 3000u16)?;
        let store_timeout = Duration::from_secs(parse_or(&lookup, "STORE_TIMEOUT_SECS", 10u64)?);
        let rate_limit_max = parse_or(&lookup, "RATE_LIMIT_MAX", 100u32)?;
        let rate_limit_window =
            Duration::from_secs(parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 15 * 60u64)?);

        Ok(Self {
            mongo_uri,
            mongo_db,
            api_key,
            api_port,
            store_timeout,
            rate_limit_max,
            rate_limit_window,
        })
    }
}

/// Parses a positive integer setting, falling back to `default` when unset.
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected a positive integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = load(&[("MONGO_URI", "mongodb://localhost"), ("API_KEY", "secret")]).unwrap();

        assert_eq!(config.api_port, 3000);
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.mongo_db, None);
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.rate_limit_window, Duration::from_secs(900));
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("MONGO_URI", "mongodb://db:27017"),
            ("API_KEY", "k"),
            ("PORT", "8080"),
            ("MONGO_DB", "travelsafe"),
            ("STORE_TIMEOUT_SECS", "3"),
            ("RATE_LIMIT_MAX", "5"),
            ("RATE_LIMIT_WINDOW_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.api_port, 8080);
        assert_eq!(config.mongo_db.as_deref(), Some("travelsafe"));
        assert_eq!(config.store_timeout, Duration::from_secs(3));
        assert_eq!(config.rate_limit_max, 5);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
    }

    #[test]
    fn missing_connection_string_fails() {
        let err = load(&[("API_KEY", "secret")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MONGO_URI")));
    }

    #[test]
    fn missing_or_empty_api_key_fails() {
        let err = load(&[("MONGO_URI", "mongodb://localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("API_KEY")));

        let err = load(&[("MONGO_URI", "mongodb://localhost"), ("API_KEY", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("API_KEY")));
    }

    #[test]
    fn rejects_bad_numbers() {
        for (key, value) in [("PORT", "http"), ("PORT", "70000"), ("PORT", "0"), ("RATE_LIMIT_MAX", "-1")] {
            let err = load(&[("MONGO_URI", "mongodb://localhost"), ("API_KEY", "k"), (key, value)])
                .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{key}={value}");
        }
    }
}
