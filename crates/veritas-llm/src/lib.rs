//! veritas-llm — generative classification backend.
//!
//! A [`RemoteClassifier`] asks a hosted LLM (Gemini) for a JSON verdict on a
//! news snippet and parses it best-effort. [`GeminiClassifierFactory`] builds
//! one per request, bound to that caller's API key.

pub mod audit;
pub mod backend;
pub mod parse;
pub mod prompts;
pub mod remote;

pub use backend::{GeminiBackend, GeminiSettings, LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use parse::{parse_classification, ParsedClassification};
pub use remote::{GeminiClassifierFactory, RemoteClassifier};
