//! NLI cross-encoder on Candle: BERT encoder + pooler + classification head.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config, HiddenAct, PositionEmbeddingType};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::{Tokenizer, TruncationParams, TruncationStrategy};
use tracing::{debug, info};

use crate::{Result, ZeroShotConfig, ZeroShotError};

/// Scores premise/hypothesis pairs for entailment.
///
/// Implementations must be usable from several threads at once; the
/// classifier calls them from blocking tasks without extra locking.
pub trait EntailmentScorer: Send + Sync + 'static {
    /// Entailment logit of `premise` against each hypothesis, in order.
    fn entailment_logits(&self, premise: &str, hypotheses: &[String]) -> Result<Vec<f32>>;

    fn model_id(&self) -> &str;
}

/// Loaded NLI model.
///
/// `forward` on every component takes `&self` and holds no mutable state, so
/// one instance is safe to share across concurrent requests.
pub struct NliModel {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    entailment_index: usize,
    model_id: String,
    device: Device,
}

struct ModelFiles {
    config_path: PathBuf,
    tokenizer_path: PathBuf,
    weights_path: PathBuf,
}

impl NliModel {
    /// Download (or reuse the hub cache) and load an NLI model.
    ///
    /// This is slow; call it once per process.
    pub async fn load(config: &ZeroShotConfig) -> Result<Self> {
        let start = Instant::now();
        info!("Loading NLI model: {}", config.model_id);

        let device = if config.use_gpu {
            Device::cuda_if_available(0).unwrap_or(Device::Cpu)
        } else {
            Device::Cpu
        };
        debug!("Using device: {:?}", device);

        let model_id = config.model_id.clone();
        let tokenizer_id = config.tokenizer_id.clone();
        let files = tokio::task::spawn_blocking(move || {
            Self::download_model(&model_id, tokenizer_id.as_deref())
        })
        .await
        .map_err(|e| ZeroShotError::Download(e.to_string()))??;

        let model = Self::from_files(config, &files, device)?;
        info!("NLI model loaded in {:.2}s", start.elapsed().as_secs_f32());
        Ok(model)
    }

    fn download_model(model_id: &str, tokenizer_id: Option<&str>) -> Result<ModelFiles> {
        let api = Api::new().map_err(|e| ZeroShotError::Download(format!("API init: {}", e)))?;
        let api_repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        info!("Downloading config.json...");
        let config_path = api_repo
            .get("config.json")
            .map_err(|e| ZeroShotError::Download(format!("config.json: {}", e)))?;

        // Prefer the checkpoint's own tokenizer.json; many fine-tuned NLI
        // checkpoints only ship vocab.txt, so fall back to the base model repo.
        let tokenizer_path = match api_repo.get("tokenizer.json") {
            Ok(path) => path,
            Err(e) => {
                let fallback = tokenizer_id.ok_or_else(|| {
                    ZeroShotError::Download(format!("tokenizer.json: {}", e))
                })?;
                info!("tokenizer.json not in {}, using {}", model_id, fallback);
                api.repo(Repo::new(fallback.to_string(), RepoType::Model))
                    .get("tokenizer.json")
                    .map_err(|e| ZeroShotError::Download(format!("{} tokenizer.json: {}", fallback, e)))?
            }
        };

        info!("Downloading model weights...");
        let weights_path = api_repo
            .get("model.safetensors")
            .or_else(|_| api_repo.get("pytorch_model.bin"))
            .map_err(|e| ZeroShotError::Download(format!("model weights: {}", e)))?;
        debug!("Weights at: {:?}", weights_path);

        Ok(ModelFiles { config_path, tokenizer_path, weights_path })
    }

    fn from_files(config: &ZeroShotConfig, files: &ModelFiles, device: Device) -> Result<Self> {
        let config_json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files.config_path)?)?;
        let bert_config = bert_config(&config_json);
        let id2label = id2label(&config_json);
        let num_labels = num_labels(&config_json, &id2label).ok_or_else(|| {
            ZeroShotError::ModelLoad("config.json has neither num_labels nor id2label".to_string())
        })?;

        let entailment_index = match config.entailment_index {
            Some(i) => i,
            None => entailment_index(&id2label).ok_or_else(|| {
                ZeroShotError::ModelLoad(format!(
                    "no entailment label in id2label {:?}; set local.entailment_index",
                    id2label
                ))
            })?,
        };
        if entailment_index >= num_labels {
            return Err(ZeroShotError::ModelLoad(format!(
                "entailment index {} out of range for {} labels",
                entailment_index, num_labels
            )));
        }

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer_path)?;
        // Cut the premise, never the hypothesis.
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_length.min(bert_config.max_position_embeddings),
                strategy: TruncationStrategy::OnlyFirst,
                ..Default::default()
            }))
            .map_err(|e| ZeroShotError::Tokenizer(e.to_string()))?;

        let vb = load_weights(&files.weights_path, &device)?;
        let hidden = bert_config.hidden_size;

        // Checkpoints exported from `BertForSequenceClassification` nest the
        // encoder under `bert.`; bare exports do not.
        let (bert, encoder_vb) = match BertModel::load(vb.pp("bert"), &bert_config) {
            Ok(m) => (m, vb.pp("bert")),
            Err(_) => (
                BertModel::load(vb.clone(), &bert_config)
                    .map_err(|e| ZeroShotError::ModelLoad(format!("BertModel: {}", e)))?,
                vb.clone(),
            ),
        };
        let pooler = candle_nn::linear(hidden, hidden, encoder_vb.pp("pooler").pp("dense"))
            .map_err(|e| ZeroShotError::ModelLoad(format!("Pooler: {}", e)))?;
        let classifier = candle_nn::linear(hidden, num_labels, vb.pp("classifier"))
            .map_err(|e| ZeroShotError::ModelLoad(format!("Classifier: {}", e)))?;

        info!(
            labels = num_labels,
            entailment_index, "NLI head loaded: {:?}", id2label
        );

        Ok(Self {
            bert,
            pooler,
            classifier,
            tokenizer,
            entailment_index,
            model_id: config.model_id.clone(),
            device,
        })
    }

    /// Run the NLI head on a batch of pairs; returns `[batch, num_labels]` logits.
    fn pair_logits(&self, premise: &str, hypotheses: &[String]) -> Result<Vec<Vec<f32>>> {
        let pairs: Vec<(&str, &str)> = hypotheses.iter().map(|h| (premise, h.as_str())).collect();
        let encodings = self
            .tokenizer
            .encode_batch(pairs, true)
            .map_err(|e| ZeroShotError::Tokenizer(e.to_string()))?;

        let batch_size = encodings.len();
        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        if max_len == 0 {
            return Err(ZeroShotError::InvalidInput("empty encoding".to_string()));
        }

        let mut input_ids = Vec::with_capacity(batch_size * max_len);
        let mut type_ids = Vec::with_capacity(batch_size * max_len);
        let mut mask = Vec::with_capacity(batch_size * max_len);
        for encoding in &encodings {
            let pad_len = max_len - encoding.get_ids().len();
            input_ids.extend_from_slice(encoding.get_ids());
            input_ids.extend(std::iter::repeat_n(0u32, pad_len));
            type_ids.extend_from_slice(encoding.get_type_ids());
            type_ids.extend(std::iter::repeat_n(0u32, pad_len));
            mask.extend(encoding.get_attention_mask().iter().map(|&m| m as f32));
            mask.extend(std::iter::repeat_n(0f32, pad_len));
        }

        let input_ids = Tensor::from_vec(input_ids, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(type_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch_size, max_len), &self.device)?;

        // [batch, seq, hidden] -> [CLS] -> pooler(tanh) -> classifier
        let hidden = self.bert.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;

        Ok(logits.to_dtype(DType::F32)?.to_vec2::<f32>()?)
    }
}

impl EntailmentScorer for NliModel {
    fn entailment_logits(&self, premise: &str, hypotheses: &[String]) -> Result<Vec<f32>> {
        let start = Instant::now();
        let logits = self.pair_logits(premise, hypotheses)?;
        debug!(
            pairs = hypotheses.len(),
            "NLI forward pass in {:.2}ms",
            start.elapsed().as_secs_f32() * 1000.0
        );
        logits
            .iter()
            .map(|row| {
                row.get(self.entailment_index).copied().ok_or_else(|| {
                    ZeroShotError::Inference(format!("logit row of width {} has no entailment column", row.len()))
                })
            })
            .collect()
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn load_weights(path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let vb = if path.extension().map(|e| e == "safetensors").unwrap_or(false) {
        // SAFETY: the file is owned by the hub cache and not modified while mapped.
        unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)? }
    } else {
        VarBuilder::from_pth(path, DType::F32, device)?
    };
    Ok(vb)
}

/// Build a Candle BERT config from `config.json`, filling BERT-base defaults.
fn bert_config(json: &serde_json::Value) -> Config {
    let hidden_act = match json.get("hidden_act").and_then(|v| v.as_str()) {
        Some("relu") => HiddenAct::Relu,
        Some("gelu_new") | Some("gelu_approximate") => HiddenAct::GeluApproximate,
        _ => HiddenAct::Gelu,
    };
    let usize_or = |key: &str, default: usize| {
        json.get(key).and_then(|v| v.as_u64()).map(|v| v as usize).unwrap_or(default)
    };
    let f64_or = |key: &str, default: f64| json.get(key).and_then(|v| v.as_f64()).unwrap_or(default);

    Config {
        vocab_size: usize_or("vocab_size", 30522),
        hidden_size: usize_or("hidden_size", 768),
        num_hidden_layers: usize_or("num_hidden_layers", 12),
        num_attention_heads: usize_or("num_attention_heads", 12),
        intermediate_size: usize_or("intermediate_size", 3072),
        hidden_act,
        hidden_dropout_prob: f64_or("hidden_dropout_prob", 0.1),
        max_position_embeddings: usize_or("max_position_embeddings", 512),
        type_vocab_size: usize_or("type_vocab_size", 2),
        initializer_range: f64_or("initializer_range", 0.02),
        layer_norm_eps: f64_or("layer_norm_eps", 1e-12),
        pad_token_id: usize_or("pad_token_id", 0),
        position_embedding_type: PositionEmbeddingType::Absolute,
        use_cache: true,
        classifier_dropout: None,
        model_type: Some("bert".to_string()),
    }
}

fn id2label(json: &serde_json::Value) -> HashMap<usize, String> {
    json["id2label"]
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Head width: explicit `num_labels`, else one past the highest `id2label` id.
fn num_labels(json: &serde_json::Value, id2label: &HashMap<usize, String>) -> Option<usize> {
    json["num_labels"]
        .as_u64()
        .map(|n| n as usize)
        .or_else(|| id2label.keys().max().map(|&i| i + 1))
        .filter(|&n| n > 0)
}

fn entailment_index(id2label: &HashMap<usize, String>) -> Option<usize> {
    id2label
        .iter()
        .find(|(_, label)| label.to_lowercase().starts_with("entail"))
        .map(|(&i, _)| i)
}
