//! Request and result types exchanged between the orchestrator, the
//! classifier adapters and the HTTP layer.

use std::collections::BTreeMap;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Output of a single classifier backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub top_label: String,
    /// In `[0, 1]`. Calibrated only for the local backend.
    pub confidence: f64,
    /// Verbatim text returned by a generative backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_model_output: Option<String>,
    /// label → score for every candidate label (local backend).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_score_vector: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Verdict of the cross-reference step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossCheckResult {
    pub verified_by_sources: Vec<String>,
    pub explanation: String,
}

/// The merged unit returned to the caller. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    classification: ClassificationResult,
    cross_check: CrossCheckResult,
}

impl AnalysisResponse {
    pub fn new(classification: ClassificationResult, cross_check: CrossCheckResult) -> Self {
        Self { classification, cross_check }
    }

    pub fn classification(&self) -> &ClassificationResult {
        &self.classification
    }

    pub fn cross_check(&self) -> &CrossCheckResult {
        &self.cross_check
    }
}

/// Which classifier family the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelMode {
    #[default]
    Local,
    Remote,
}

impl ModelMode {
    /// Parse the caller-supplied mode flag.
    ///
    /// Accepts `local`/`hf` and `remote`/`gemini` (any case). Anything else,
    /// including a missing or blank flag, selects [`ModelMode::Local`].
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            Some("remote") | Some("gemini") => ModelMode::Remote,
            _ => ModelMode::Local,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelMode::Local => "local",
            ModelMode::Remote => "remote",
        }
    }
}

/// Resolved dispatch target. The remote variant owns the caller's credential,
/// so a remote backend cannot be selected without one.
#[derive(Debug)]
pub enum Backend {
    Local,
    Remote(SecretString),
}

impl Backend {
    pub fn mode(&self) -> ModelMode {
        match self {
            Backend::Local => ModelMode::Local,
            Backend::Remote(_) => ModelMode::Remote,
        }
    }
}

/// One analysis request as seen by the orchestrator.
#[derive(Debug)]
pub struct AnalysisRequest {
    text: String,
    mode: ModelMode,
    remote_api_key: Option<SecretString>,
}

impl AnalysisRequest {
    /// Build a request. The text is trimmed; a blank API key counts as absent.
    pub fn new(text: impl AsRef<str>, mode: ModelMode, remote_api_key: Option<String>) -> Self {
        let remote_api_key = remote_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(SecretString::from);

        Self {
            text: text.as_ref().trim().to_string(),
            mode,
            remote_api_key,
        }
    }

    pub fn local(text: impl AsRef<str>) -> Self {
        Self::new(text, ModelMode::Local, None)
    }

    pub fn remote(text: impl AsRef<str>, api_key: impl Into<String>) -> Self {
        Self::new(text, ModelMode::Remote, Some(api_key.into()))
    }

    /// Validate the request and split it into its text and dispatch target.
    pub fn into_parts(self) -> Result<(String, Backend), ValidationError> {
        if self.text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let backend = match (self.mode, self.remote_api_key) {
            (ModelMode::Local, _) => Backend::Local,
            (ModelMode::Remote, Some(key)) => Backend::Remote(key),
            (ModelMode::Remote, None) => return Err(ValidationError::MissingApiKey),
        };
        Ok((self.text, backend))
    }

    /// Validate the request and return only its dispatch target.
    pub fn backend(self) -> Result<Backend, ValidationError> {
        self.into_parts().map(|(_, backend)| backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    #[test]
    fn test_mode_flag_defaults_to_local() {
        assert_eq!(ModelMode::from_flag(None), ModelMode::Local);
        assert_eq!(ModelMode::from_flag(Some("")), ModelMode::Local);
        assert_eq!(ModelMode::from_flag(Some("something-else")), ModelMode::Local);
        assert_eq!(ModelMode::from_flag(Some("hf")), ModelMode::Local);
    }

    #[test]
    fn test_mode_flag_remote_spellings() {
        assert_eq!(ModelMode::from_flag(Some("REMOTE")), ModelMode::Remote);
        assert_eq!(ModelMode::from_flag(Some(" gemini ")), ModelMode::Remote);
    }

    #[test]
    fn test_remote_without_key_is_rejected() {
        let err = AnalysisRequest::new("text", ModelMode::Remote, None).backend().unwrap_err();
        assert_eq!(err, ValidationError::MissingApiKey);

        let err = AnalysisRequest::new("text", ModelMode::Remote, Some("   ".into()))
            .backend()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingApiKey);
    }

    #[test]
    fn test_remote_with_key_carries_secret() {
        match AnalysisRequest::remote("text", " AIza-test ").backend().unwrap() {
            Backend::Remote(key) => assert_eq!(key.expose_secret(), "AIza-test"),
            other => panic!("expected remote backend, got {other:?}"),
        }
    }

    #[test]
    fn test_local_ignores_key() {
        let backend = AnalysisRequest::new("text", ModelMode::Local, Some("k".into()))
            .backend()
            .unwrap();
        assert_eq!(backend.mode(), ModelMode::Local);
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let err = AnalysisRequest::local("  \n ").backend().unwrap_err();
        assert_eq!(err, ValidationError::EmptyText);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let req = AnalysisRequest::remote("text", "super-secret-key");
        assert!(!format!("{req:?}").contains("super-secret-key"));
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let result = ClassificationResult {
            top_label: "satire".into(),
            confidence: 0.5,
            raw_model_output: None,
            full_score_vector: None,
            rationale: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"top_label": "satire", "confidence": 0.5}));
    }
}
