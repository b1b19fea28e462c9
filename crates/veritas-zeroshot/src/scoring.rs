//! Single-label scoring over per-hypothesis entailment logits.

use std::collections::BTreeMap;

use veritas_core::ClassificationResult;

use crate::{Result, ZeroShotError};

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Turn one entailment logit per label into a classification.
///
/// Scores are soft-maxed across labels, so they sum to 1. The highest score
/// wins; ties go to the label listed first.
pub fn rank_labels(labels: &[String], entailment_logits: &[f32]) -> Result<ClassificationResult> {
    if labels.is_empty() {
        return Err(ZeroShotError::InvalidInput("no candidate labels".to_string()));
    }
    if labels.len() != entailment_logits.len() {
        return Err(ZeroShotError::Inference(format!(
            "expected {} entailment logits, got {}",
            labels.len(),
            entailment_logits.len()
        )));
    }
    if entailment_logits.iter().any(|l| !l.is_finite()) {
        return Err(ZeroShotError::Inference(format!(
            "non-finite entailment logits: {entailment_logits:?}"
        )));
    }

    let scores = softmax(entailment_logits);

    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }

    let full_score_vector: BTreeMap<String, f64> =
        labels.iter().cloned().zip(scores.iter().copied()).collect();

    Ok(ClassificationResult {
        top_label: labels[best].clone(),
        confidence: scores[best],
        raw_model_output: None,
        full_score_vector: Some(full_score_vector),
        rationale: None,
    })
}
