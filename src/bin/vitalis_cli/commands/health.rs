// ABOUTME: `health` subcommand - probes the configured inference endpoint
// ABOUTME: Fails with a non-zero exit when the endpoint is unreachable or unhealthy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::{bail, Result};
use vitalis::llm::{LlmProvider, OpenAiCompatibleProvider};

pub async fn run() -> Result<()> {
    let provider = OpenAiCompatibleProvider::from_env()?;
    let base_url = &provider.config().base_url;

    if provider.health_check().await? {
        println!(
            "{} at {base_url} is healthy (model {})",
            provider.display_name(),
            provider.default_model()
        );
        Ok(())
    } else {
        bail!("{} at {base_url} answered but reported unhealthy", provider.display_name())
    }
}
