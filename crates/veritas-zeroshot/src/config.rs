//! Configuration for the zero-shot classifier.

use serde::{Deserialize, Serialize};

/// Configuration for the NLI-backed zero-shot classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroShotConfig {
    /// Hugging Face model ID of a BERT sequence-classification NLI checkpoint
    pub model_id: String,

    /// Repository to fetch `tokenizer.json` from when the checkpoint ships none
    pub tokenizer_id: Option<String>,

    /// Hypothesis template; `{}` is replaced with the candidate label
    pub hypothesis_template: String,

    /// Maximum sequence length of one premise/hypothesis pair
    pub max_length: usize,

    /// Index of the entailment class in the NLI head.
    /// When unset it is read from `id2label` in `config.json`.
    pub entailment_index: Option<usize>,

    /// Use GPU if available
    pub use_gpu: bool,
}

impl Default for ZeroShotConfig {
    fn default() -> Self {
        Self {
            model_id: "ishan/bert-base-uncased-mnli".to_string(),
            tokenizer_id: Some("bert-base-uncased".to_string()),
            hypothesis_template: "This example is {}.".to_string(),
            max_length: 512,
            entailment_index: None,
            use_gpu: false,
        }
    }
}

impl ZeroShotConfig {
    /// Render the hypothesis for one label.
    pub fn hypothesis(&self, label: &str) -> String {
        self.hypothesis_template.replace("{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hypothesis_template() {
        let config = ZeroShotConfig::default();
        assert_eq!(config.hypothesis("satire"), "This example is satire.");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ZeroShotConfig = serde_json::from_str(r#"{"max_length": 128}"#).unwrap();
        assert_eq!(config.max_length, 128);
        assert_eq!(config.hypothesis_template, "This example is {}.");
        assert!(!config.use_gpu);
    }
}
