//! Configuration management for the routing library.
//!
//! Library users can build a [`RouterConfig`] directly or start from
//! `RouterConfig::default()`. Binaries load it from the environment with
//! [`RouterConfig::from_env`], which validates every value it reads.

use crate::errors::{ConfigError, Result};
use crate::gas::GasModel;
use crate::split::Streams;
use std::env;
use std::time::Duration;

/// Defaults applied to routing calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Maximum pools per route
    pub max_hops: usize,
    /// How trade amounts are split
    pub streams: Streams,
    /// Deadline for one routing call, unbounded when `None`
    pub timeout: Option<Duration>,
    /// Gas units per hop, by pool type
    pub gas_model: GasModel,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_hops: Self::DEFAULT_MAX_HOPS,
            streams: Streams::default(),
            timeout: None,
            gas_model: GasModel::default(),
        }
    }
}

impl RouterConfig {
    pub const DEFAULT_MAX_HOPS: usize = 4;
    pub const MAX_HOPS_LIMIT: usize = 8;

    /// Create a new configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// All optional:
    /// - `ROUTER_MAX_HOPS`: Maximum pools per route, 1 to 8 (default: 4)
    /// - `ROUTER_STREAMS`: Stream count such as `3` or weights such as `1,1,2` (default: 1)
    /// - `ROUTER_TIMEOUT_MS`: Deadline per routing call in milliseconds (default: none)
    /// - `ROUTER_GAS_CONSTANT_PRODUCT`: Gas units per constant-product hop (default: 90000)
    /// - `ROUTER_GAS_CONCENTRATED`: Gas units per concentrated hop (default: 110000)
    /// - `ROUTER_GAS_STABLE`: Gas units per stable hop (default: 180000)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed or is out of range
    pub fn from_env() -> Result<Self> {
        tracing::info!("Loading router configuration from environment");
        let defaults = Self::default();

        let max_hops = match env::var("ROUTER_MAX_HOPS") {
            Ok(value) => {
                let max_hops: usize = Self::parse_var("ROUTER_MAX_HOPS", &value)?;
                if !(1..=Self::MAX_HOPS_LIMIT).contains(&max_hops) {
                    tracing::error!(max_hops = max_hops, "Max hops out of range");
                    return Err(Self::invalid(format!(
                        "ROUTER_MAX_HOPS must be between 1 and {}, got: {}",
                        Self::MAX_HOPS_LIMIT,
                        max_hops
                    )));
                }
                max_hops
            }
            Err(_) => {
                tracing::debug!("ROUTER_MAX_HOPS not set, using default: {}", defaults.max_hops);
                defaults.max_hops
            }
        };

        let streams = match env::var("ROUTER_STREAMS") {
            Ok(value) => {
                let streams: Streams = value.parse().map_err(|error| {
                    Self::invalid(format!("Invalid ROUTER_STREAMS value: {}", error))
                })?;
                if matches!(streams, Streams::Count(0)) || streams.is_empty() {
                    return Err(Self::invalid("ROUTER_STREAMS must name at least one stream"));
                }
                streams
            }
            Err(_) => defaults.streams,
        };

        let timeout = match env::var("ROUTER_TIMEOUT_MS") {
            Ok(value) => {
                let timeout_ms: u64 = Self::parse_var("ROUTER_TIMEOUT_MS", &value)?;
                if timeout_ms == 0 {
                    return Err(Self::invalid("ROUTER_TIMEOUT_MS must be greater than 0"));
                }
                Some(Duration::from_millis(timeout_ms))
            }
            Err(_) => None,
        };

        let gas_model = GasModel {
            constant_product: Self::gas_var(
                "ROUTER_GAS_CONSTANT_PRODUCT",
                defaults.gas_model.constant_product,
            )?,
            concentrated: Self::gas_var("ROUTER_GAS_CONCENTRATED", defaults.gas_model.concentrated)?,
            stable: Self::gas_var("ROUTER_GAS_STABLE", defaults.gas_model.stable)?,
        };

        let config = Self {
            max_hops,
            streams,
            timeout,
            gas_model,
        };

        tracing::info!(
            max_hops = config.max_hops,
            streams = %config.streams,
            timeout_ms = config.timeout.map(|timeout| timeout.as_millis() as u64),
            gas_constant_product = config.gas_model.constant_product,
            gas_concentrated = config.gas_model.concentrated,
            gas_stable = config.gas_model.stable,
            "Router configuration loaded successfully"
        );

        Ok(config)
    }

    fn gas_var(name: &str, default: u64) -> Result<u64> {
        match env::var(name) {
            Ok(value) => {
                let gas: u64 = Self::parse_var(name, &value)?;
                if gas == 0 {
                    return Err(Self::invalid(format!("{} must be greater than 0", name)));
                }
                tracing::debug!(variable = name, gas = gas, "Gas override loaded");
                Ok(gas)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
        value.trim().parse().map_err(|_| {
            tracing::error!(variable = name, value = value, "Unparseable configuration value");
            Self::invalid(format!("Invalid {} value: {}. Must be a valid integer", name, value))
        })
    }

    fn invalid(message: impl Into<String>) -> crate::errors::RouterError {
        ConfigError::InvalidConfiguration {
            message: message.into(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Use a mutex to ensure tests don't interfere with each other's environment variables
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "ROUTER_MAX_HOPS",
        "ROUTER_STREAMS",
        "ROUTER_TIMEOUT_MS",
        "ROUTER_GAS_CONSTANT_PRODUCT",
        "ROUTER_GAS_CONCENTRATED",
        "ROUTER_GAS_STABLE",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_config_from_env_defaults() {
        let _guard = TEST_MUTEX.lock().unwrap();
        clear_env();

        let config = RouterConfig::from_env().unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.max_hops, 4);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_config_from_env_overrides() {
        let _guard = TEST_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("ROUTER_MAX_HOPS", "2");
        env::set_var("ROUTER_STREAMS", "1,1,2");
        env::set_var("ROUTER_TIMEOUT_MS", "1500");
        env::set_var("ROUTER_GAS_STABLE", "200000");

        let config = RouterConfig::from_env().unwrap();
        assert_eq!(config.max_hops, 2);
        assert_eq!(config.streams, Streams::Weights(vec![1, 1, 2]));
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.gas_model.stable, 200_000);
        assert_eq!(config.gas_model.constant_product, GasModel::DEFAULT_CONSTANT_PRODUCT_GAS);

        clear_env();
    }

    #[test]
    fn test_config_from_env_rejects_out_of_range_values() {
        let _guard = TEST_MUTEX.lock().unwrap();

        for (var, value, expected) in [
            ("ROUTER_MAX_HOPS", "0", "between 1 and 8"),
            ("ROUTER_MAX_HOPS", "9", "between 1 and 8"),
            ("ROUTER_MAX_HOPS", "many", "valid integer"),
            ("ROUTER_STREAMS", "0", "at least one stream"),
            ("ROUTER_STREAMS", "a,b", "ROUTER_STREAMS"),
            ("ROUTER_TIMEOUT_MS", "0", "greater than 0"),
            ("ROUTER_GAS_CONCENTRATED", "0", "greater than 0"),
        ] {
            clear_env();
            env::set_var(var, value);

            let result = RouterConfig::from_env();
            assert!(result.is_err(), "Expected {}={} to be rejected", var, value);
            assert!(
                result.unwrap_err().to_string().contains(expected),
                "Unexpected error for {}={}",
                var,
                value
            );
        }

        clear_env();
    }
}
