//! Runtime configuration for flows and the simulator.
//!
//! Read from the environment:
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `BANKCASH_NOTARY` | name of the preferred notary | first notary on the network |
//! | `BANKCASH_CURRENCY` | currency used by the simulator | `USD` |
//! | `BANKCASH_LOG_FORMAT` | `json` or `pretty` | `json` |
//!
//! `RUST_LOG` controls filtering (see `bankcash-observability`).

use thiserror::Error;

use bankcash_core::Currency;
use bankcash_observability::LogFormat;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub preferred_notary: Option<String>,
    pub default_currency: Currency,
    pub log_format: LogFormat,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            preferred_notary: None,
            default_currency: Currency::USD,
            log_format: LogFormat::Json,
        }
    }
}

impl FlowConfig {
    pub const NOTARY_VAR: &'static str = "BANKCASH_NOTARY";
    pub const CURRENCY_VAR: &'static str = "BANKCASH_CURRENCY";
    pub const LOG_FORMAT_VAR: &'static str = "BANKCASH_LOG_FORMAT";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank values use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(name) = get(Self::NOTARY_VAR) {
            config.preferred_notary = Some(name.trim().to_string());
        }

        if let Some(code) = get(Self::CURRENCY_VAR) {
            config.default_currency = Currency::new(&code).map_err(|e| ConfigError {
                key: Self::CURRENCY_VAR,
                reason: e.to_string(),
            })?;
        }

        if let Some(format) = get(Self::LOG_FORMAT_VAR) {
            config.log_format = format.parse().map_err(|e: bankcash_observability::UnknownLogFormat| {
                ConfigError {
                    key: Self::LOG_FORMAT_VAR,
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(config)
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
    fn empty_environment_gives_defaults() {
        let config = FlowConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, FlowConfig::default());
    }

    #[test]
    fn values_are_read_and_normalised() {
        let config = FlowConfig::from_lookup(lookup(&[
            ("BANKCASH_NOTARY", " Notary B "),
            ("BANKCASH_CURRENCY", "eur"),
            ("BANKCASH_LOG_FORMAT", "pretty"),
        ]))
        .unwrap();
        assert_eq!(config.preferred_notary.as_deref(), Some("Notary B"));
        assert_eq!(config.default_currency, Currency::EUR);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = FlowConfig::from_lookup(lookup(&[("BANKCASH_NOTARY", "  ")])).unwrap();
        assert_eq!(config.preferred_notary, None);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = FlowConfig::from_lookup(lookup(&[("BANKCASH_CURRENCY", "dollars")])).unwrap_err();
        assert_eq!(err.key, "BANKCASH_CURRENCY");

        let err = FlowConfig::from_lookup(lookup(&[("BANKCASH_LOG_FORMAT", "xml")])).unwrap_err();
        assert_eq!(err.key, "BANKCASH_LOG_FORMAT");
    }
}
