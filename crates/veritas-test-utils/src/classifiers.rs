//! `TextClassifier` and `RemoteClassifierFactory` doubles.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use veritas_core::{
    labels::CANDIDATE_LABELS, ClassificationResult, ClassifyError, RemoteClassifierFactory, TextClassifier,
};

/// Always returns the same result.
pub struct FixedClassifier {
    result: ClassificationResult,
    model_id: String,
}

impl FixedClassifier {
    /// A local-style result: `label` scores 0.7, the other candidates 0.1 each.
    pub fn with_label(label: &str) -> Self {
        let scores: BTreeMap<String, f64> = CANDIDATE_LABELS
            .iter()
            .map(|l| (l.to_string(), if *l == label { 0.7 } else { 0.1 }))
            .collect();
        Self::new(ClassificationResult {
            top_label: label.to_string(),
            confidence: 0.7,
            raw_model_output: None,
            full_score_vector: Some(scores),
            rationale: None,
        })
    }

    pub fn new(result: ClassificationResult) -> Self {
        Self {
            result,
            model_id: "fixed".to_string(),
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}

#[async_trait]
impl TextClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult, ClassifyError> {
        Ok(self.result.clone())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Always fails with the given error message.
pub struct FailingClassifier {
    message: String,
}

impl FailingClassifier {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[async_trait]
impl TextClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult, ClassifyError> {
        Err(ClassifyError::Inference(self.message.clone()))
    }

    fn model_id(&self) -> &str {
        "failing"
    }
}

/// Remote factory that records how many classifiers it built and with which keys.
pub struct CountingRemoteFactory {
    created: AtomicUsize,
    keys: std::sync::Mutex<Vec<String>>,
    fail: Option<String>,
}

impl CountingRemoteFactory {
    pub fn new() -> Self {
        Self { created: AtomicUsize::new(0), keys: std::sync::Mutex::new(Vec::new()), fail: None }
    }

    /// Built classifiers fail with a remote error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { fail: Some(message.into()), ..Self::new() }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn keys_seen(&self) -> Vec<String> {
        self.keys.lock().map(|k| k.clone()).unwrap_or_default()
    }
}

impl Default for CountingRemoteFactory {
    fn default() -> Self {
        Self::new()
    }
}

struct RemoteDouble {
    fail: Option<String>,
}

#[async_trait]
impl TextClassifier for RemoteDouble {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult, ClassifyError> {
        match &self.fail {
            Some(message) => Err(ClassifyError::Remote(message.clone())),
            None => Ok(ClassificationResult {
                top_label: "propaganda".to_string(),
                confidence: 1.0,
                raw_model_output: Some(r#"{"label":"propaganda","rationale":"x"}"#.to_string()),
                full_score_vector: None,
                rationale: Some("x".to_string()),
            }),
        }
    }

    fn model_id(&self) -> &str {
        "remote-double"
    }
}

impl RemoteClassifierFactory for CountingRemoteFactory {
    fn create(&self, api_key: SecretString) -> Box<dyn TextClassifier> {
        self.created.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut keys) = self.keys.lock() {
            keys.push(api_key.expose_secret().to_string());
        }
        Box::new(RemoteDouble { fail: self.fail.clone() })
    }

    fn model_id(&self) -> &str {
        "remote-double"
    }
}
