//! `POST /analyze`: classify a snippet and cross-check it.

use axum::{extract::State, Json};
use serde::Deserialize;
use veritas_core::{AnalysisRequest, AnalysisResponse, ModelMode, ValidationError};

use crate::error::ApiError;
use crate::state::SharedState;

/// Request body.
///
/// The older `model_type` / `gemini_key` names are still read. When a body
/// carries both spellings, `model_mode` and a non-blank `remote_api_key` win.
///
/// No `Debug`: the body carries the caller's API key.
#[derive(Deserialize, Default)]
pub struct AnalyzeBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub model_mode: Option<String>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub remote_api_key: Option<String>,
    #[serde(default)]
    pub gemini_key: Option<String>,
}

impl AnalyzeBody {
    pub fn mode(&self) -> ModelMode {
        ModelMode::from_flag(self.model_mode.as_deref().or(self.model_type.as_deref()))
    }

    pub fn api_key(&mut self) -> Option<String> {
        self.remote_api_key
            .take()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.gemini_key.take())
    }
}

pub async fn analyze(
    State(state): State<SharedState>,
    Json(mut body): Json<AnalyzeBody>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let text = body.text.take().unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText.into());
    }

    let mode = body.mode();
    tracing::debug!(mode = mode.as_str(), bytes = text.len(), "Analyze request");

    let request = AnalysisRequest::new(text, mode, body.api_key());
    let response = state.service.analyze(request).await?;
    Ok(Json(response))
}
