//! Scripted `LlmBackend` for exercising the remote classifier offline.

use std::sync::Mutex;

use async_trait::async_trait;
use veritas_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};

enum Reply {
    Text(String),
    Status(u16, String),
}

/// Replies with a fixed completion (or API error) and records every request.
pub struct ScriptedBackend {
    reply: Reply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedBackend {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Text(text.into()))
    }

    /// Reply with `value` serialised as the completion text.
    pub fn replying_json(value: serde_json::Value) -> Self {
        Self::replying(value.to_string())
    }

    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Status(status, message.into()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self { reply, requests: Mutex::new(Vec::new()) }
    }

    /// Prompts received so far, concatenated per request.
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|reqs| {
                reqs.iter()
                    .map(|r| r.messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n"))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        if let Ok(mut reqs) = self.requests.lock() {
            reqs.push(req);
        }
        match &self.reply {
            Reply::Text(text) => Ok(LlmResponse {
                content: text.clone(),
                model: "scripted".to_string(),
                prompt_tokens: 0,
                completion_tokens: 0,
            }),
            Reply::Status(status, message) => Err(LlmError::ApiError { status: *status, message: message.clone() }),
        }
    }

    fn model_id(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
