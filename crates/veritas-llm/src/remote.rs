//! Remote classifier adapter and its per-request factory.

use std::time::Instant;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, warn};
use veritas_core::{ClassificationResult, ClassifyError, RemoteClassifierFactory, TextClassifier, UNKNOWN_LABEL};

use crate::audit::LlmAuditEntry;
use crate::backend::{GeminiBackend, GeminiSettings, LlmBackend, LlmError, LlmRequest};
use crate::parse::parse_classification;
use crate::prompts::classification_prompt;

/// Classifies text by prompting a generative backend for a JSON verdict.
pub struct RemoteClassifier {
    backend: Box<dyn LlmBackend>,
}

impl RemoteClassifier {
    pub fn new(backend: Box<dyn LlmBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TextClassifier for RemoteClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        let start = Instant::now();
        let response = self.backend.complete(LlmRequest::prompt(classification_prompt(text))).await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        LlmAuditEntry::new(self.backend.name(), &response, latency_ms).emit();

        let raw = response.content.trim().to_string();
        let parsed = parse_classification(&raw);
        if !parsed.parsed {
            warn!(model = %response.model, "Model output was not a JSON object");
        }
        debug!(label = %parsed.label, "Remote verdict parsed");

        // No probability from a generative model: 1.0 for any answer, 0.0 for none.
        let confidence = if parsed.label != UNKNOWN_LABEL { 1.0 } else { 0.0 };

        Ok(ClassificationResult {
            top_label: parsed.label,
            confidence,
            raw_model_output: Some(raw),
            full_score_vector: None,
            rationale: Some(parsed.rationale),
        })
    }

    fn model_id(&self) -> &str {
        self.backend.model_id()
    }
}

/// Builds a fresh Gemini-backed classifier for each caller's key.
///
/// Only the settings and the HTTP connection pool are shared between the
/// classifiers it creates.
pub struct GeminiClassifierFactory {
    settings: GeminiSettings,
    client: reqwest::Client,
}

impl GeminiClassifierFactory {
    pub fn new(settings: GeminiSettings) -> Result<Self, LlmError> {
        let client = settings.build_client()?;
        Ok(Self { settings, client })
    }
}

impl RemoteClassifierFactory for GeminiClassifierFactory {
    fn create(&self, api_key: SecretString) -> Box<dyn TextClassifier> {
        let backend = GeminiBackend::with_client(self.client.clone(), api_key, self.settings.clone());
        Box::new(RemoteClassifier::new(Box::new(backend)))
    }

    fn model_id(&self) -> &str {
        &self.settings.model
    }
}
