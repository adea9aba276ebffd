// ABOUTME: Pipeline settings: sampling cap, rendering, measurement bounds, inference limits
// ABOUTME: Loaded from VITALIS_* environment variables with defaults and range validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vitalis_core::constants::{cache, env_config, inference, measurements, payload, sampling};
use vitalis_core::errors::AppResult;
use vitalis_intelligence::{DateGranularity, PayloadOptions, SamplingCap};

use super::ConfigError;

/// Settings for one pipeline deployment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    /// Maximum points retained per metric
    pub sample_cap: usize,
    /// Decimal places in the data table
    pub value_precision: usize,
    /// Date rendering mode
    pub date_granularity: DateGranularity,
    /// Raw measurements required before inference is attempted
    pub min_measurements: usize,
    /// Count bound passed to the measurement source
    pub max_measurements: usize,
    /// Hard timeout on the inference await, in seconds
    pub inference_timeout_secs: u64,
    /// Catalog metadata cache TTL, in seconds
    pub catalog_cache_ttl_secs: u64,
    /// Sampling temperature sent with the inference request
    pub temperature: f32,
    /// Completion budget sent with the inference request
    pub max_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_cap: sampling::DEFAULT_SAMPLE_CAP,
            value_precision: payload::DEFAULT_VALUE_PRECISION,
            date_granularity: DateGranularity::default(),
            min_measurements: measurements::DEFAULT_MIN_MEASUREMENTS,
            max_measurements: measurements::DEFAULT_MAX_MEASUREMENTS,
            inference_timeout_secs: inference::DEFAULT_TIMEOUT_SECS,
            catalog_cache_ttl_secs: cache::DEFAULT_CATALOG_TTL_SECS,
            temperature: inference::DEFAULT_TEMPERATURE,
            max_tokens: inference::DEFAULT_MAX_TOKENS,
        }
    }
}

/// Read a variable, falling back to `default` when unset
fn env_or<T>(variable: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Ok(raw) = env::var(variable) else {
        return Ok(default);
    };
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
        variable,
        reason: e.to_string(),
        value: raw,
    })
}

impl PipelineConfig {
    /// Load configuration from environment and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or a value is out of range
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            sample_cap: env_or(env_config::SAMPLE_CAP, defaults.sample_cap)?,
            value_precision: env_or(env_config::VALUE_PRECISION, defaults.value_precision)?,
            date_granularity: env_or(env_config::DATE_FORMAT, defaults.date_granularity)?,
            min_measurements: env_or(env_config::MIN_MEASUREMENTS, defaults.min_measurements)?,
            max_measurements: env_or(env_config::MAX_MEASUREMENTS, defaults.max_measurements)?,
            inference_timeout_secs: env_or(
                env_config::INFERENCE_TIMEOUT_SECS,
                defaults.inference_timeout_secs,
            )?,
            catalog_cache_ttl_secs: env_or(
                env_config::CATALOG_CACHE_TTL_SECS,
                defaults.catalog_cache_ttl_secs,
            )?,
            temperature: env_or(env_config::LLM_TEMPERATURE, defaults.temperature)?,
            max_tokens: env_or(env_config::LLM_MAX_TOKENS, defaults.max_tokens)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns an error describing the first out-of-range value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_cap == 0 {
            return Err(ConfigError::ValueOutOfRange("sample_cap must be at least 1"));
        }
        if self.value_precision > payload::MAX_VALUE_PRECISION {
            return Err(ConfigError::ValueOutOfRange(
                "value_precision must be at most 6",
            ));
        }
        if self.inference_timeout_secs == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "inference_timeout_secs must be at least 1",
            ));
        }
        if self.max_measurements < self.min_measurements {
            return Err(ConfigError::ValueOutOfRange(
                "max_measurements must not be below min_measurements",
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValueOutOfRange(
                "temperature must be between 0.0 and 2.0",
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ValueOutOfRange("max_tokens must be at least 1"));
        }
        Ok(())
    }

    /// Validated sampling cap
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a cap of zero
    pub fn sampling_cap(&self) -> AppResult<SamplingCap> {
        SamplingCap::new(self.sample_cap)
    }

    /// Rendering options relative to `reference_time`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the precision is out of range
    pub fn payload_options(&self, reference_time: DateTime<Utc>) -> AppResult<PayloadOptions> {
        PayloadOptions::new(self.value_precision, self.date_granularity, reference_time)
    }

    /// Inference timeout as a duration
    #[must_use]
    pub const fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }

    /// Catalog cache TTL as a duration
    #[must_use]
    pub const fn catalog_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_cap, 8);
        assert_eq!(config.inference_timeout(), Duration::from_secs(120));
        assert_eq!(config.date_granularity, DateGranularity::DateOnly);
    }

    #[test]
    fn test_zero_cap_rejected() {
        let config = PipelineConfig {
            sample_cap: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange(_))
        ));
    }

    #[test]
    fn test_precision_and_timeout_bounds() {
        let config = PipelineConfig {
            value_precision: 7,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            inference_timeout_secs: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_measurement_bounds_ordered() {
        let config = PipelineConfig {
            min_measurements: 10,
            max_measurements: 5,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
