// ABOUTME: OpenAI-compatible chat-completions provider for the analysis inference call
// ABOUTME: Works with hosted endpoints and local servers (Ollama, vLLM, LocalAI)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # OpenAI-Compatible Provider
//!
//! ## Configuration
//!
//! - `VITALIS_LLM_BASE_URL`: API base URL (default: `http://localhost:11434/v1`)
//! - `VITALIS_LLM_MODEL`: model name (default: `qwen2.5:14b-instruct`)
//! - `VITALIS_LLM_API_KEY`: bearer token, optional for local servers

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use vitalis_core::constants::{env_config, service_names};
use vitalis_core::errors::{AppError, ErrorCode};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default base URL (Ollama)
const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";

/// Default model
const DEFAULT_MODEL: &str = "qwen2.5:14b-instruct";

/// Connection timeout in seconds
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Transport-level request timeout; the pipeline applies its own, shorter
/// timeout around the whole call
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Characters of an error body kept in messages
const ERROR_BODY_PREVIEW: usize = 200;

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., `http://localhost:11434/v1`)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Human-readable name for logs and errors
    pub display_name: String,
    /// Capabilities of this endpoint
    pub capabilities: LlmCapabilities,
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            default_model: DEFAULT_MODEL.to_owned(),
            display_name: "Local LLM".to_owned(),
            capabilities: LlmCapabilities::structured_output(),
        }
    }
}

impl OpenAiCompatibleConfig {
    /// Read endpoint settings from `VITALIS_LLM_*` variables
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var(env_config::LLM_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let default_model =
            env::var(env_config::LLM_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_owned());
        let api_key = env::var(env_config::LLM_API_KEY)
            .ok()
            .filter(|k| !k.is_empty());

        let display_name = Self::display_name_for(&base_url);
        Self {
            base_url,
            api_key,
            default_model,
            display_name: display_name.to_owned(),
            capabilities: LlmCapabilities::structured_output(),
        }
    }

    /// Guess a readable name from the well-known local ports
    fn display_name_for(base_url: &str) -> &'static str {
        if base_url.contains(":11434") {
            "Ollama (Local)"
        } else if base_url.contains(":8000") {
            "vLLM (Local)"
        } else if base_url.contains(":8080") {
            "LocalAI"
        } else if base_url.contains("localhost") || base_url.contains("127.0.0.1") {
            "Local LLM"
        } else {
            "Hosted LLM"
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Chat-completions client
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a provider with explicit configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a provider from `VITALIS_LLM_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn from_env() -> Result<Self, AppError> {
        let config = OpenAiCompatibleConfig::from_env();
        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initializing {} provider",
            config.display_name
        );
        Self::new(config)
    }

    /// Endpoint configuration
    #[must_use]
    pub const fn config(&self) -> &OpenAiCompatibleConfig {
        &self.config
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    fn build_request(&self, request: &ChatRequest) -> OpenAiRequest {
        let json_mode = request.json_mode && self.config.capabilities.supports_json_mode();
        OpenAiRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.default_model.clone()),
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        }
    }

    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }

    fn transport_error(&self, e: &reqwest::Error) -> AppError {
        error!("Failed to send request to {}: {}", self.config.display_name, e);
        if e.is_timeout() {
            AppError::new(
                ErrorCode::ExternalTimeout,
                format!("{} request timed out", self.config.display_name),
            )
        } else if e.is_connect() {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!(
                    "Cannot connect to {}. Is the server running at {}?",
                    self.config.display_name, self.config.base_url
                ),
            )
        } else {
            AppError::external_service(service_names::INFERENCE, format!("Request failed: {e}"))
        }
    }

    /// Map a non-success HTTP status and body to a typed error
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let detail = error_response.error;
            let error_type = detail.error_type.unwrap_or_else(|| "unknown".to_owned());

            match status.as_u16() {
                401 | 403 => AppError::new(
                    ErrorCode::ExternalAuthFailed,
                    format!("API authentication failed: {}", detail.message),
                ),
                429 => AppError::new(
                    ErrorCode::ExternalRateLimited,
                    Self::extract_rate_limit_message(&detail.message),
                ),
                400 => AppError::invalid_input(format!(
                    "API validation error: {}",
                    detail.message
                )),
                404 => AppError::not_found(format!(
                    "Model or endpoint not found: {}",
                    detail.message
                )),
                502..=504 => AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("Service unavailable: {}", detail.message),
                ),
                _ => AppError::external_service(
                    service_names::INFERENCE,
                    format!("{error_type} - {}", detail.message),
                ),
            }
        } else {
            // Local servers often answer with plain text or HTML
            match status.as_u16() {
                429 => AppError::new(
                    ErrorCode::ExternalRateLimited,
                    Self::extract_rate_limit_message(body),
                ),
                502..=504 => AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    "Inference server is not responding",
                ),
                _ => AppError::external_service(
                    service_names::INFERENCE,
                    format!(
                        "API error ({status}): {}",
                        body.chars().take(ERROR_BODY_PREVIEW).collect::<String>()
                    ),
                ),
            }
        }
    }

    /// Turn "try again in 7.2s" style messages into a whole-second hint
    fn extract_rate_limit_message(message: &str) -> String {
        const MARKER: &str = "try again in ";
        if let Some(retry_pos) = message.to_lowercase().find(MARKER) {
            let after_prefix = &message[retry_pos + MARKER.len()..];
            let end_pos = after_prefix
                .find(|c: char| !c.is_ascii_digit() && c != '.')
                .unwrap_or(after_prefix.len());
            if let Ok(seconds) = after_prefix[..end_pos].parse::<f64>() {
                let seconds_int = seconds.ceil() as u64;
                return format!(
                    "Inference rate limit reached. Please try again in {seconds_int} seconds."
                );
            }
        }
        "Inference rate limit reached. Please wait a moment and try again.".to_owned()
    }

    fn chat_response_from(&self, response: OpenAiResponse) -> Result<ChatResponse, AppError> {
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AppError::external_service(service_names::INFERENCE, "Response contained no choices")
        })?;

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            warn!("{} returned an empty completion", self.config.display_name);
        }

        Ok(ChatResponse {
            content,
            model: response
                .model
                .unwrap_or_else(|| self.config.default_model.clone()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    fn display_name(&self) -> &str {
        &self.config.display_name
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let openai_request = self.build_request(request);
        debug!(
            messages = openai_request.messages.len(),
            json_mode = openai_request.response_format.is_some(),
            "Sending chat completion request to {}",
            self.config.display_name
        );

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(&openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read API response: {}", e);
            AppError::external_service(
                service_names::INFERENCE,
                format!("Failed to read response: {e}"),
            )
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse API response: {} - body: {}",
                e,
                body.chars().take(ERROR_BODY_PREVIEW).collect::<String>()
            );
            AppError::external_service(
                service_names::INFERENCE,
                format!("Failed to parse response envelope: {e}"),
            )
        })?;

        let chat_response = self.chat_response_from(openai_response)?;
        debug!(
            content_len = chat_response.content.len(),
            finish_reason = ?chat_response.finish_reason,
            "Received chat completion"
        );
        Ok(chat_response)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        let request = self.client.get(self.api_url("models"));
        let response = self
            .add_auth_header(request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let healthy = response.status().is_success();
        if healthy {
            debug!("{} health check passed", self.config.display_name);
        } else {
            warn!(
                status = %response.status(),
                "{} health check failed",
                self.config.display_name
            );
        }
        Ok(healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(capabilities: LlmCapabilities) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
            base_url: "http://localhost:11434/v1/".to_owned(),
            capabilities,
            ..OpenAiCompatibleConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let provider = provider(LlmCapabilities::structured_output());
        assert_eq!(
            provider.api_url("chat/completions"),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_json_mode_follows_capabilities() {
        let request = ChatRequest::new(vec![ChatMessage::user("x")]).with_json_mode();

        let body = serde_json::to_value(
            provider(LlmCapabilities::structured_output()).build_request(&request),
        )
        .unwrap();
        assert_eq!(body["response_format"], json!({"type": "json_object"}));
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["stream"], false);

        let body = serde_json::to_value(
            provider(LlmCapabilities::SYSTEM_MESSAGES).build_request(&request),
        )
        .unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_error_mapping() {
        let body = r#"{"error": {"message": "bad key", "type": "auth"}}"#;
        let err = OpenAiCompatibleProvider::parse_error_response(StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.code, ErrorCode::ExternalAuthFailed);

        let body = r#"{"error": {"message": "Please try again in 7.2s"}}"#;
        let err =
            OpenAiCompatibleProvider::parse_error_response(StatusCode::TOO_MANY_REQUESTS, body);
        assert_eq!(err.code, ErrorCode::ExternalRateLimited);
        assert!(err.message.contains("8 seconds"));

        let err =
            OpenAiCompatibleProvider::parse_error_response(StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
        assert!(err.code.is_transient());

        let err = OpenAiCompatibleProvider::parse_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        );
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }

    #[test]
    fn test_empty_choices_is_error() {
        let provider = provider(LlmCapabilities::structured_output());
        let response: OpenAiResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(provider.chat_response_from(response).is_err());
    }

    #[test]
    fn test_display_name_detection() {
        assert_eq!(
            OpenAiCompatibleConfig::display_name_for("http://localhost:8000/v1"),
            "vLLM (Local)"
        );
        assert_eq!(
            OpenAiCompatibleConfig::display_name_for("https://api.example.com/v1"),
            "Hosted LLM"
        );
    }
}
