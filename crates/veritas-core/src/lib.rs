//! veritas-core — shared types, errors and traits used across all Veritas crates.
//!
//! Holds the backend-selection contract: a request names a [`ModelMode`],
//! [`AnalysisRequest::backend`] turns it into a [`Backend`] (enforcing the
//! credential rule), and [`AnalysisService`] dispatches to the matching
//! [`TextClassifier`] before attaching a cross-reference verdict.

pub mod classifier;
pub mod cross_check;
pub mod error;
pub mod labels;
pub mod model;
pub mod service;

// Re-export commonly used types
pub use classifier::{RemoteClassifierFactory, TextClassifier};
pub use cross_check::{CrossReferencer, MockCrossReferencer};
pub use error::{AnalysisError, ClassifyError, ValidationError};
pub use labels::{CANDIDATE_LABELS, UNKNOWN_LABEL};
pub use model::{
    AnalysisRequest, AnalysisResponse, Backend, ClassificationResult, CrossCheckResult, ModelMode,
};
pub use service::AnalysisService;
