//! Process configuration read from the environment.
//!
//! A `.env` file in the working directory is honoured (see [`AppConfig::from_env`]).
//! Every variable has a default except the optional collaborators
//! (record seed file, database, generative-AI key).

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use agrocast_forecast::{Absence, EngineSettings};
use thiserror::Error;

pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-flash:generateContent";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Where crop records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    /// Empty in-memory store, or one seeded from a JSON file.
    InMemory { seed: Option<PathBuf> },
    /// Postgres `crop_records` table.
    Postgres { database_url: String },
}

/// Generative-AI collaborator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub artifacts_dir: PathBuf,
    pub records: RecordSource,
    pub feature_seed: Option<u64>,
    pub strict_encoders: bool,
    pub engine: EngineSettings,
    /// `None` disables the disease and fertilizer routes.
    pub gemini: Option<GeminiConfig>,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = parse_or(&get, "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or(&get, "PORT", 8080u16)?;
        let artifacts_dir = get("AGROCAST_ARTIFACTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("artifacts"));

        let records = if parse_bool_or(&get, "USE_PERSISTENT_STORES", false)? {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            RecordSource::Postgres { database_url }
        } else {
            RecordSource::InMemory {
                seed: get("AGROCAST_RECORDS_PATH").map(PathBuf::from),
            }
        };

        let feature_seed = get("AGROCAST_FEATURE_SEED")
            .map(|v| parse_value::<u64>("AGROCAST_FEATURE_SEED", v))
            .transpose()?;

        let defaults = EngineSettings::default();
        let max_forecast_months = parse_or(&get, "AGROCAST_MAX_FORECAST_MONTHS", defaults.max_forecast_months)?;
        if max_forecast_months == 0 {
            return Err(invalid("AGROCAST_MAX_FORECAST_MONTHS", "0", "must be at least 1"));
        }
        let fallback_price = finite_or(&get, "AGROCAST_FALLBACK_PRICE", defaults.fallback_price)?;
        let fallback_demand = finite_or(&get, "AGROCAST_FALLBACK_DEMAND", defaults.fallback_demand)?;
        let snapshot_absence = if parse_bool_or(&get, "AGROCAST_ZERO_IS_ABSENT", true)? {
            Absence::MissingOrZero
        } else {
            Absence::Missing
        };

        let engine = EngineSettings {
            fallback_price,
            fallback_demand,
            max_forecast_months,
            snapshot_absence,
            ..defaults
        };

        let gemini = get("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            endpoint: get("GEMINI_ENDPOINT").unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string()),
        });

        Ok(Self {
            host,
            port,
            artifacts_dir,
            records,
            feature_seed,
            strict_encoders: parse_bool_or(&get, "AGROCAST_STRICT_ENCODERS", true)?,
            engine,
            gemini,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn invalid(var: &'static str, value: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.into(),
        reason: reason.into(),
    }
}

fn parse_value<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| invalid(var, value.clone(), e.to_string()))
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(var).map(|v| parse_value(var, v)).transpose().map(|v| v.unwrap_or(default))
}

fn finite_or<G>(get: &G, var: &'static str, default: f64) -> Result<f64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let value = parse_or(get, var, default)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(var, value.to_string(), "must be finite"))
    }
}

fn parse_bool_or<G>(get: &G, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(var, v, "expected true or false")),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.artifacts_dir, PathBuf::from("artifacts"));
        assert_eq!(cfg.records, RecordSource::InMemory { seed: None });
        assert_eq!(cfg.engine, EngineSettings::default());
        assert!(cfg.strict_encoders);
        assert!(cfg.gemini.is_none());
        assert!(cfg.feature_seed.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("AGROCAST_RECORDS_PATH", "seed.json"),
            ("AGROCAST_FEATURE_SEED", "42"),
            ("AGROCAST_MAX_FORECAST_MONTHS", "24"),
            ("AGROCAST_FALLBACK_PRICE", "55.5"),
            ("AGROCAST_ZERO_IS_ABSENT", "false"),
            ("AGROCAST_STRICT_ENCODERS", "no"),
            ("GEMINI_API_KEY", "k"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(
            cfg.records,
            RecordSource::InMemory {
                seed: Some(PathBuf::from("seed.json"))
            }
        );
        assert_eq!(cfg.feature_seed, Some(42));
        assert_eq!(cfg.engine.max_forecast_months, 24);
        assert_eq!(cfg.engine.fallback_price, 55.5);
        assert_eq!(cfg.engine.fallback_demand, 100.0);
        assert_eq!(cfg.engine.snapshot_absence, Absence::Missing);
        assert!(!cfg.strict_encoders);

        let gemini = cfg.gemini.unwrap();
        assert_eq!(gemini.api_key, "k");
        assert_eq!(gemini.endpoint, DEFAULT_GEMINI_ENDPOINT);
    }

    #[test]
    fn persistent_store_requires_database_url() {
        let err = config(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let cfg = config(&[("USE_PERSISTENT_STORES", "true"), ("DATABASE_URL", "postgres://x")]).unwrap();
        assert_eq!(
            cfg.records,
            RecordSource::Postgres {
                database_url: "postgres://x".into()
            }
        );
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));

        let err = config(&[("AGROCAST_FALLBACK_DEMAND", "NaN")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "AGROCAST_FALLBACK_DEMAND", .. }));

        let err = config(&[("AGROCAST_MAX_FORECAST_MONTHS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "AGROCAST_MAX_FORECAST_MONTHS", .. }));

        let err = config(&[("AGROCAST_ZERO_IS_ABSENT", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("AGROCAST_ZERO_IS_ABSENT"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("PORT", "  "), ("GEMINI_API_KEY", "")]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert!(cfg.gemini.is_none());
    }
}
