//! Test doubles shared by the Veritas crates' integration tests.
//!
//! Nothing here touches the network or loads a model.

pub mod backend;
pub mod classifiers;

pub use backend::ScriptedBackend;
pub use classifiers::{CountingRemoteFactory, FailingClassifier, FixedClassifier};
