// ABOUTME: Integration tests for the OpenAI-compatible provider over real HTTP
// ABOUTME: A one-shot local TCP server answers health checks and chat completions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use vitalis::llm::{
    ChatMessage, ChatRequest, LlmCapabilities, LlmProvider, OpenAiCompatibleConfig,
    OpenAiCompatibleProvider,
};
use vitalis_core::errors::ErrorCode;

/// Request as seen by the server: lowercased head plus raw body
struct CapturedRequest {
    head: String,
    body: String,
}

/// Accept one connection, answer it with `status` and `body`, return what was sent
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 4096];

        let head_end = loop {
            let read = socket.read(&mut chunk).await.unwrap();
            assert!(read > 0, "client closed before sending headers");
            buffer.extend_from_slice(&chunk[..read]);
            if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buffer[..head_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map_or(0, |value| value.trim().parse::<usize>().unwrap());
        while buffer.len() < head_end + content_length {
            let read = socket.read(&mut chunk).await.unwrap();
            assert!(read > 0, "client closed before sending the body");
            buffer.extend_from_slice(&chunk[..read]);
        }
        let request_body =
            String::from_utf8_lossy(&buffer[head_end..head_end + content_length]).into_owned();

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        CapturedRequest {
            head,
            body: request_body,
        }
    });

    (base_url, handle)
}

fn provider_for(base_url: String, api_key: Option<&str>) -> OpenAiCompatibleProvider {
    OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
        base_url,
        api_key: api_key.map(str::to_owned),
        default_model: "health-analyst".to_owned(),
        display_name: "Test Endpoint".to_owned(),
        capabilities: LlmCapabilities::structured_output(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_health_check_passes_on_success_status() {
    let (base_url, server) = serve_once("200 OK", json!({"data": []}).to_string()).await;
    let provider = provider_for(base_url, Some("secret"));

    assert!(provider.health_check().await.unwrap());

    let request = server.await.unwrap();
    assert!(request.head.starts_with("get /v1/models "), "{}", request.head);
    assert!(request.head.contains("authorization: bearer secret"));
}

#[tokio::test]
async fn test_health_check_reports_unhealthy_status() {
    let (base_url, server) =
        serve_once("503 Service Unavailable", json!({"error": "loading"}).to_string()).await;
    let provider = provider_for(base_url, None);

    assert!(!provider.health_check().await.unwrap());

    let request = server.await.unwrap();
    assert!(!request.head.contains("authorization:"));
}

#[tokio::test]
async fn test_health_check_unreachable_endpoint_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
    drop(listener);

    let err = provider_for(base_url, None).health_check().await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
    assert!(err.code.is_transient());
}

#[tokio::test]
async fn test_complete_sends_json_mode_and_parses_reply() {
    let reply = json!({
        "model": "health-analyst-2024",
        "choices": [{
            "message": {"role": "assistant", "content": "{\"sum\": \"stable\"}"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
    });
    let (base_url, server) = serve_once("200 OK", reply.to_string()).await;
    let provider = provider_for(base_url, None);
    let request = ChatRequest::new(vec![
        ChatMessage::system("analyse"),
        ChatMessage::user("## DATA"),
    ])
    .with_json_mode()
    .with_temperature(0.2);

    let response = provider.complete(&request).await.unwrap();

    assert_eq!(response.content, "{\"sum\": \"stable\"}");
    assert_eq!(response.model, "health-analyst-2024");
    assert_eq!(response.usage.unwrap().total_tokens, 150);
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("post /v1/chat/completions "));
    let sent: Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(sent["model"], "health-analyst");
    assert_eq!(sent["response_format"], json!({"type": "json_object"}));
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1]["content"], "## DATA");
}

#[tokio::test]
async fn test_complete_maps_rate_limit_status() {
    let body = json!({"error": {"message": "Rate limited, try again in 2.5s", "type": "rate_limit"}});
    let (base_url, server) = serve_once("429 Too Many Requests", body.to_string()).await;
    let provider = provider_for(base_url, None);

    let err = provider
        .complete(&ChatRequest::new(vec![ChatMessage::user("x")]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalRateLimited);
    assert!(err.message.contains("3 seconds"));
    server.await.unwrap();
}
