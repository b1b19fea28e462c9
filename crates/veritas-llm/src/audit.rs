//! Audit records for generative backend calls.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::backend::LlmResponse;

/// One completed remote call. Holds a hash of the output, never the prompt
/// or the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    pub model: String,
    pub backend: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: String,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

impl LlmAuditEntry {
    pub fn new(backend: &str, response: &LlmResponse, latency_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: response.model.clone(),
            backend: backend.to_string(),
            prompt_tokens: response.prompt_tokens,
            completion_tokens: response.completion_tokens,
            output_hash: sha256_hex(&response.content),
            latency_ms,
            called_at: Utc::now(),
        }
    }

    pub fn emit(&self) {
        info!(
            audit_id = %self.id,
            backend = %self.backend,
            model = %self.model,
            prompt_tokens = self.prompt_tokens,
            completion_tokens = self.completion_tokens,
            output_hash = %self.output_hash,
            latency_ms = self.latency_ms,
            "LLM call"
        );
    }
}

fn sha256_hex(output: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(output.as_bytes());
    format!("{:x}", hasher.finalize())
}
