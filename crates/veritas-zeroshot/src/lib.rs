//! Veritas zero-shot classifier
//!
//! Local, Rust-native zero-shot classification of news snippets using an NLI
//! (natural language inference) checkpoint loaded through Candle.
//!
//! Each candidate label is turned into a hypothesis ("This example is satire.")
//! and scored against the snippet as premise. The entailment logits of all
//! hypotheses are soft-maxed across labels, giving a single-label distribution
//! that sums to 1.
//!
//! # Example
//! ```rust,no_run
//! use veritas_core::TextClassifier;
//! use veritas_zeroshot::{ZeroShotClassifier, ZeroShotConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let classifier = ZeroShotClassifier::load(ZeroShotConfig::default()).await?;
//!     let result = classifier.classify("Aliens endorse mayoral candidate").await?;
//!     println!("{} ({:.3})", result.top_label, result.confidence);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod nli;
pub mod scoring;

pub use classifier::ZeroShotClassifier;
pub use config::ZeroShotConfig;
pub use error::{Result, ZeroShotError};
pub use nli::{EntailmentScorer, NliModel};
