//! `TextClassifier` implementation over an entailment scorer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use veritas_core::labels::candidate_labels;
use veritas_core::{ClassificationResult, ClassifyError, TextClassifier};

use crate::nli::{EntailmentScorer, NliModel};
use crate::{scoring, Result, ZeroShotConfig};

/// Zero-shot classifier over the fixed candidate label set.
///
/// Cheap to clone; the scorer is shared.
pub struct ZeroShotClassifier<S: EntailmentScorer = NliModel> {
    scorer: Arc<S>,
    labels: Arc<Vec<String>>,
    hypotheses: Arc<Vec<String>>,
}

impl<S: EntailmentScorer> Clone for ZeroShotClassifier<S> {
    fn clone(&self) -> Self {
        Self {
            scorer: Arc::clone(&self.scorer),
            labels: Arc::clone(&self.labels),
            hypotheses: Arc::clone(&self.hypotheses),
        }
    }
}

impl ZeroShotClassifier<NliModel> {
    /// Load the NLI model named in `config` and wrap it.
    pub async fn load(config: ZeroShotConfig) -> Result<Self> {
        let model = NliModel::load(&config).await?;
        Ok(Self::with_scorer(model, &config))
    }
}

impl<S: EntailmentScorer> ZeroShotClassifier<S> {
    /// Wrap an already-loaded scorer.
    pub fn with_scorer(scorer: S, config: &ZeroShotConfig) -> Self {
        let labels = candidate_labels();
        let hypotheses = labels.iter().map(|l| config.hypothesis(l)).collect();
        Self {
            scorer: Arc::new(scorer),
            labels: Arc::new(labels),
            hypotheses: Arc::new(hypotheses),
        }
    }
}

#[async_trait]
impl<S: EntailmentScorer> TextClassifier for ZeroShotClassifier<S> {
    async fn classify(&self, text: &str) -> std::result::Result<ClassificationResult, ClassifyError> {
        let scorer = Arc::clone(&self.scorer);
        let labels = Arc::clone(&self.labels);
        let hypotheses = Arc::clone(&self.hypotheses);
        let premise = text.to_string();

        // Candle inference is CPU-bound; keep it off the async workers.
        let result = tokio::task::spawn_blocking(move || {
            let logits = scorer.entailment_logits(&premise, &hypotheses)?;
            scoring::rank_labels(&labels, &logits)
        })
        .await
        .map_err(|e| ClassifyError::Inference(format!("inference task failed: {}", e)))??;

        debug!(
            top_label = %result.top_label,
            confidence = result.confidence,
            "Zero-shot classification complete"
        );
        Ok(result)
    }

    fn model_id(&self) -> &str {
        self.scorer.model_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Returns a logit per hypothesis from a lookup on the label word.
    struct KeywordScorer {
        seen: Mutex<Vec<String>>,
    }

    impl EntailmentScorer for KeywordScorer {
        fn entailment_logits(&self, premise: &str, hypotheses: &[String]) -> Result<Vec<f32>> {
            self.seen.lock().unwrap().extend(hypotheses.iter().cloned());
            Ok(hypotheses
                .iter()
                .map(|h| if h.contains("satire") && premise.contains("Onion") { 3.0 } else { 0.0 })
                .collect())
        }

        fn model_id(&self) -> &str {
            "keyword"
        }
    }

    fn classifier() -> ZeroShotClassifier<KeywordScorer> {
        let scorer = KeywordScorer { seen: Mutex::new(Vec::new()) };
        ZeroShotClassifier::with_scorer(scorer, &ZeroShotConfig::default())
    }

    #[tokio::test]
    async fn test_scores_form_distribution() {
        let result = classifier().classify("The Onion reports a local man").await.unwrap();

        assert_eq!(result.top_label, "satire");
        let scores = result.full_score_vector.unwrap();
        assert_eq!(scores.len(), 4);
        assert!((scores.values().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!(scores.values().all(|&s| (0.0..=1.0).contains(&s)));
        let max = scores.values().cloned().fold(f64::MIN, f64::max);
        assert_eq!(result.confidence, max);
        assert!(result.raw_model_output.is_none());
    }

    #[tokio::test]
    async fn test_hypotheses_use_template() {
        let c = classifier();
        c.classify("anything").await.unwrap();
        let seen = c.scorer.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                "This example is fake news.",
                "This example is real news.",
                "This example is propaganda.",
                "This example is satire.",
            ]
        );
    }

    #[tokio::test]
    async fn test_scorer_error_is_inference_error() {
        struct Broken;
        impl EntailmentScorer for Broken {
            fn entailment_logits(&self, _: &str, _: &[String]) -> Result<Vec<f32>> {
                Err(crate::ZeroShotError::Inference("boom".into()))
            }
            fn model_id(&self) -> &str {
                "broken"
            }
        }

        let c = ZeroShotClassifier::with_scorer(Broken, &ZeroShotConfig::default());
        let err = c.classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifyError::Inference(_)));
        assert_eq!(c.model_id(), "broken");
    }
}
