//! Gemini backend over real HTTP against a one-shot canned server.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use veritas_core::{ClassifyError, RemoteClassifierFactory, TextClassifier};
use veritas_llm::{GeminiBackend, GeminiClassifierFactory, GeminiSettings, LlmBackend, LlmError, LlmRequest};

const KEY: &str = "test-key-123";

/// Serve one response, then hand back the raw request that was received.
async fn serve_once(status: u16, body: &'static str) -> (GeminiSettings, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let head_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before request head");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();

        String::from_utf8_lossy(&buf).into_owned()
    });

    let settings = GeminiSettings { base_url: format!("http://{}", addr), ..Default::default() };
    (settings, handle)
}

fn key() -> SecretString {
    SecretString::from(KEY.to_string())
}

#[tokio::test]
async fn test_verdict_parsed_and_key_sent_in_header() {
    let (settings, server) = serve_once(
        200,
        r#"{"candidates":[{"content":{"parts":[{"text":"{\"label\":\"satire\",\"rationale\":\"r\"}"}]}}],"modelVersion":"gemini-1.5-flash-002"}"#,
    )
    .await;
    let factory = GeminiClassifierFactory::new(settings).unwrap();

    let result = factory.create(key()).classify("Local man wins argument").await.unwrap();

    assert_eq!(result.top_label, "satire");
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.rationale.as_deref(), Some("r"));

    let request = server.await.unwrap();
    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with("POST /v1beta/models/gemini-1.5-flash:generateContent"));
    assert!(!request_line.contains(KEY));
    assert!(request.to_lowercase().contains(&format!("x-goog-api-key: {}", KEY)));
    assert!(request.contains("Local man wins argument"));
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let (settings, server) = serve_once(
        400,
        r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
    )
    .await;
    let factory = GeminiClassifierFactory::new(settings).unwrap();

    let err = factory.create(key()).classify("story").await.unwrap_err();

    match err {
        ClassifyError::Remote(msg) => {
            assert!(msg.contains("400"), "{}", msg);
            assert!(msg.contains("API key not valid"), "{}", msg);
        }
        other => panic!("expected Remote, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_429_is_rate_limit() {
    let (settings, server) = serve_once(429, r#"{"error":{"message":"quota"}}"#).await;
    let backend = GeminiBackend::new(key(), settings).unwrap();

    let err = backend.complete(LlmRequest::prompt("x")).await.unwrap_err();

    assert!(matches!(err, LlmError::RateLimitExceeded), "{:?}", err);
    server.await.unwrap();
}

#[tokio::test]
async fn test_blocked_prompt_is_classification_error() {
    let (settings, server) =
        serve_once(200, r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).await;
    let factory = GeminiClassifierFactory::new(settings).unwrap();

    let err = factory.create(key()).classify("story").await.unwrap_err();

    match err {
        ClassifyError::Remote(msg) => assert!(msg.contains("SAFETY"), "{}", msg),
        other => panic!("expected Remote, got {:?}", other),
    }
    server.await.unwrap();
}
