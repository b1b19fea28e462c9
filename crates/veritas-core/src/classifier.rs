//! Classification capability shared by the local and remote backends.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::ClassifyError;
use crate::model::ClassificationResult;

/// Anything that can label a news snippet.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// Classify non-empty text.
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError>;

    /// Identifier of the underlying model, for logs and health output.
    fn model_id(&self) -> &str;
}

/// Builds a remote classifier bound to one caller's credential.
///
/// Called once per remote request; the returned classifier must not be cached
/// or shared with another caller.
pub trait RemoteClassifierFactory: Send + Sync {
    fn create(&self, api_key: SecretString) -> Box<dyn TextClassifier>;

    fn model_id(&self) -> &str;
}
