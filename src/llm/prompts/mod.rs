// ABOUTME: System instruction for the structured health-analysis inference call
// ABOUTME: Loaded at compile time from markdown so the schema text stays easy to edit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

/// Health analysis system instruction
///
/// Describes the payload blocks and the abbreviated-key JSON object the
/// reconciler understands:
/// - Role and constraints (no diagnosis, evidence only from the data)
/// - Input block layout (`DATA`, `LEGEND`, `DERIVED`, `KPI WORKLIST`, `DATA GAPS`)
/// - Output keys and their item shapes
pub const ANALYSIS_SYSTEM_PROMPT: &str = include_str!("health_analysis_system.md");

/// Get the system instruction for the analysis call
#[must_use]
pub const fn get_analysis_system_prompt() -> &'static str {
    ANALYSIS_SYSTEM_PROMPT
}
