use thiserror::Error;

/// Failure inside a classifier backend (local inference or remote call).
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Remote model call failed: {0}")]
    Remote(String),
}

/// Request rejected before any backend was invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No text provided.")]
    EmptyText,

    #[error("No Gemini API key provided.")]
    MissingApiKey,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Classification(#[from] ClassifyError),
}

impl AnalysisError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AnalysisError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
