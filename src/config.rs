// Copyright (c) 2025 - Cowboy AI, Inc.
//! Engine configuration loaded from environment variables.

use std::time::Duration;

use crate::carbon::DEFAULT_FALLBACK_BASELINE_KG;
use crate::errors::{StoreError, StoreResult};
use crate::nats::NatsConfig;

/// Tunables for the coordinator, sweeper and NATS transport
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Compare-and-set attempts per operation before giving up with
    /// `Contention`
    pub max_commit_attempts: u32,
    /// Period of the background expiry sweep
    pub sweep_interval: Duration,
    /// Baseline footprint (kg CO2e) used when a product has none
    pub fallback_baseline_kg: f64,
    pub nats: NatsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: 16,
            sweep_interval: Duration::from_secs(3600),
            fallback_baseline_kg: DEFAULT_FALLBACK_BASELINE_KG,
            nats: NatsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `GROUP_BUY_*` and `NATS_*` variables
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_commit_attempts = match lookup("GROUP_BUY_MAX_COMMIT_ATTEMPTS") {
            Some(raw) => parse::<u32>("GROUP_BUY_MAX_COMMIT_ATTEMPTS", &raw)?,
            None => defaults.max_commit_attempts,
        };
        let sweep_interval = match lookup("GROUP_BUY_SWEEP_INTERVAL_SECS") {
            Some(raw) => Duration::from_secs(parse::<u64>("GROUP_BUY_SWEEP_INTERVAL_SECS", &raw)?),
            None => defaults.sweep_interval,
        };
        let fallback_baseline_kg = match lookup("GROUP_BUY_FALLBACK_BASELINE_KG") {
            Some(raw) => parse::<f64>("GROUP_BUY_FALLBACK_BASELINE_KG", &raw)?,
            None => defaults.fallback_baseline_kg,
        };

        let mut nats = defaults.nats;
        if let Some(url) = lookup("NATS_URL") {
            nats.servers = url
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(name) = lookup("NATS_CLIENT_NAME") {
            nats.name = name;
        }

        let config = Self {
            max_commit_attempts,
            sweep_interval,
            fallback_baseline_kg,
            nats,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> StoreResult<()> {
        if self.max_commit_attempts == 0 {
            return Err(StoreError::Configuration(
                "GROUP_BUY_MAX_COMMIT_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(StoreError::Configuration(
                "GROUP_BUY_SWEEP_INTERVAL_SECS must be positive".to_string(),
            ));
        }
        if !self.fallback_baseline_kg.is_finite() || self.fallback_baseline_kg <= 0.0 {
            return Err(StoreError::Configuration(
                "GROUP_BUY_FALLBACK_BASELINE_KG must be a positive number".to_string(),
            ));
        }
        if self.nats.servers.is_empty() {
            return Err(StoreError::Configuration("NATS_URL is empty".to_string()));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> StoreResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| StoreError::Configuration(format!("Invalid {key}: {raw:?}")))
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
    fn test_defaults_without_variables() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_commit_attempts, 16);
        assert_eq!(config.sweep_interval, Duration::from_secs(3600));
        assert_eq!(config.fallback_baseline_kg, 10.0);
        assert_eq!(config.nats.name, "group-buy-engine");
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("GROUP_BUY_MAX_COMMIT_ATTEMPTS", "4"),
            ("GROUP_BUY_SWEEP_INTERVAL_SECS", "60"),
            ("GROUP_BUY_FALLBACK_BASELINE_KG", "12.5"),
            ("NATS_URL", "nats://a:4222, nats://b:4222"),
            ("NATS_CLIENT_NAME", "gb-test"),
        ]))
        .unwrap();

        assert_eq!(config.max_commit_attempts, 4);
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.fallback_baseline_kg, 12.5);
        assert_eq!(config.nats.servers, vec!["nats://a:4222", "nats://b:4222"]);
        assert_eq!(config.nats.name, "gb-test");
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        for vars in [
            [("GROUP_BUY_MAX_COMMIT_ATTEMPTS", "zero")],
            [("GROUP_BUY_MAX_COMMIT_ATTEMPTS", "0")],
            [("GROUP_BUY_SWEEP_INTERVAL_SECS", "0")],
            [("GROUP_BUY_FALLBACK_BASELINE_KG", "-1")],
            [("NATS_URL", " , ")],
        ] {
            let err = EngineConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, StoreError::Configuration(_)), "{vars:?}");
        }
    }
}
