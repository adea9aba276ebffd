// ABOUTME: Configuration error types for pipeline settings loaded from the environment
// ABOUTME: Defines parse and range failures convertible into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration error types for pipeline validation.

use thiserror::Error;
use vitalis_core::errors::{AppError, ErrorCode};

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable present but not parseable
    #[error("Parse error: {variable}={value:?}: {reason}")]
    Parse {
        /// Variable name
        variable: &'static str,
        /// Raw value as found
        value: String,
        /// Parser message
        reason: String,
    },

    /// Numeric value outside valid range for parameter
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        Self::new(ErrorCode::ConfigInvalid, error.to_string())
    }
}
