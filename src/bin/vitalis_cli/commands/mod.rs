// ABOUTME: Re-exports command modules for vitalis-cli
// ABOUTME: One module per subcommand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod analyze;
pub mod catalog;
pub mod health;
pub mod prepare;
pub mod reconcile;
