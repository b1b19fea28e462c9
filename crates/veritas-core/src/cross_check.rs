//! Cross-reference step run after classification.
//!
//! Only a placeholder rule exists today. It sits behind [`CrossReferencer`]
//! so a real source-corroboration collaborator can be swapped in through
//! [`AnalysisService::with_cross_referencer`](crate::AnalysisService::with_cross_referencer).

use crate::model::CrossCheckResult;

pub trait CrossReferencer: Send + Sync {
    fn check(&self, text: &str) -> CrossCheckResult;
}

/// Substrings that make the mock report "no coverage". Case-sensitive.
const UNCOVERED_MARKERS: [&str; 2] = ["US", "China"];

/// Deterministic stand-in: a pure function of the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCrossReferencer;

impl CrossReferencer for MockCrossReferencer {
    fn check(&self, text: &str) -> CrossCheckResult {
        if UNCOVERED_MARKERS.iter().any(|m| text.contains(m)) {
            CrossCheckResult {
                verified_by_sources: Vec::new(),
                explanation: "No reputable mainstream coverage found (mock).".to_string(),
            }
        } else {
            CrossCheckResult {
                verified_by_sources: vec!["MockNewsSource".to_string()],
                explanation: "No major conflict statements found.".to_string(),
            }
        }
    }
}
