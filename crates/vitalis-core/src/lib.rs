// ABOUTME: Core types and constants for the Vitalis health-metrics pipeline
// ABOUTME: Foundation crate with error handling, measurement models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Vitalis Core
//!
//! Foundation crate providing shared types and constants for the Vitalis
//! health-metrics pipeline. This crate is designed to change infrequently,
//! enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Pipeline defaults and limits organized by concern
//! - **models**: Measurement data model shared by every pipeline stage

/// Unified error handling system with standard error codes
pub mod errors;

/// Pipeline constants and default configuration values
pub mod constants;

/// Measurement and metric data models
pub mod models;
