//! LLM backend trait and the Gemini implementation.
//!
//! Only text completion is needed here; the backend sends one prompt and
//! returns whatever text the model produced.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use veritas_core::ClassifyError;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error("Model returned no text: {0}")]
    EmptyCompletion(String),
}

impl From<LlmError> for ClassifyError {
    fn from(e: LlmError) -> Self {
        ClassifyError::Remote(e.to_string())
    }
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String, // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Single-turn request with backend defaults for everything else.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self { messages: vec![Message::user(text)], ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
    /// Short backend name for audit records, e.g. `"gemini"`.
    fn name(&self) -> &str;
}

#[async_trait]
impl<B: LlmBackend + ?Sized> LlmBackend for std::sync::Arc<B> {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).complete(req).await
    }
    fn model_id(&self) -> &str { (**self).model_id() }
    fn name(&self) -> &str { (**self).name() }
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    if status == 429 {
        return Err(LlmError::RateLimitExceeded);
    }
    if status >= 400 {
        let body: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
        let message = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(LlmError::ApiError { status, message });
    }
    Ok(serde_json::from_str(&text)?)
}

// ── Google Gemini ─────────────────────────────────────────────────────────────

/// Settings shared by every Gemini call; never holds a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 30,
            max_output_tokens: 1024,
            temperature: 0.1,
        }
    }
}

impl GeminiSettings {
    /// HTTP client with the configured request timeout.
    pub fn build_client(&self) -> Result<reqwest::Client, LlmError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?)
    }
}

pub struct GeminiBackend {
    settings: GeminiSettings,
    api_key: SecretString,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: SecretString, settings: GeminiSettings) -> Result<Self, LlmError> {
        let client = settings.build_client()?;
        Ok(Self::with_client(client, api_key, settings))
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(client: reqwest::Client, api_key: SecretString, settings: GeminiSettings) -> Self {
        Self { settings, api_key, client }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }
}

/// Convert messages to the Gemini `contents` format.
/// A system message becomes `systemInstruction`.
fn gemini_body(req: &LlmRequest, settings: &GeminiSettings) -> serde_json::Value {
    let system_text = req.messages.iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.clone());

    let contents: Vec<serde_json::Value> = req.messages.iter()
        .filter(|m| m.role != "system")
        .map(|m| {
            let role = if m.role == "assistant" { "model" } else { "user" };
            serde_json::json!({
                "role": role,
                "parts": [{ "text": m.content }]
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "contents": contents,
        "generationConfig": {
            "maxOutputTokens": req.max_tokens.unwrap_or(settings.max_output_tokens),
            "temperature":     req.temperature.unwrap_or(settings.temperature),
        }
    });
    if let Some(sys) = system_text {
        body["systemInstruction"] = serde_json::json!({
            "parts": [{ "text": sys }]
        });
    }
    body
}

fn gemini_response(json: &serde_json::Value, model: &str) -> Result<LlmResponse, LlmError> {
    let parts = json["candidates"][0]["content"]["parts"].as_array();
    let content: Option<String> = parts.map(|parts| {
        parts.iter().filter_map(|p| p["text"].as_str()).collect::<Vec<_>>().join("")
    });

    let content = match content {
        Some(c) if !c.is_empty() => c,
        _ => {
            // Blocked prompts come back without candidates.
            let reason = json["promptFeedback"]["blockReason"]
                .as_str()
                .or_else(|| json["candidates"][0]["finishReason"].as_str())
                .unwrap_or("no candidates");
            return Err(LlmError::EmptyCompletion(reason.to_string()));
        }
    };

    Ok(LlmResponse {
        content,
        model: json["modelVersion"].as_str().unwrap_or(model).to_string(),
        prompt_tokens: json["usageMetadata"]["promptTokenCount"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usageMetadata"]["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
    })
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let model = req.model.as_deref().unwrap_or(&self.settings.model);
        let body = gemini_body(&req, &self.settings);

        // Key goes in a header so it never appears in a logged URL.
        let resp = self.client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;
        gemini_response(&json, model)
    }

    fn model_id(&self) -> &str { &self.settings.model }
    fn name(&self) -> &str { "gemini" }
}
