//! Error types for the zero-shot classifier.

use thiserror::Error;
use veritas_core::ClassifyError;

pub type Result<T> = std::result::Result<T, ZeroShotError>;

#[derive(Error, Debug)]
pub enum ZeroShotError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Model download failed: {0}")]
    Download(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<candle_core::Error> for ZeroShotError {
    fn from(e: candle_core::Error) -> Self {
        ZeroShotError::Inference(e.to_string())
    }
}

impl From<tokenizers::Error> for ZeroShotError {
    fn from(e: tokenizers::Error) -> Self {
        ZeroShotError::Tokenizer(e.to_string())
    }
}

impl From<ZeroShotError> for ClassifyError {
    fn from(e: ZeroShotError) -> Self {
        ClassifyError::Inference(e.to_string())
    }
}
