//! Analysis orchestrator: picks a backend, classifies, cross-checks and merges.

use std::sync::Arc;
use std::time::Instant;

use crate::classifier::{RemoteClassifierFactory, TextClassifier};
use crate::cross_check::{CrossReferencer, MockCrossReferencer};
use crate::error::Result;
use crate::model::{AnalysisRequest, AnalysisResponse, Backend};

/// Routes analysis requests to the local or a per-request remote classifier.
///
/// The local classifier is loaded once by the caller and injected here; it is
/// shared by every request. Remote classifiers are built per request from the
/// caller's credential and dropped afterwards.
#[derive(Clone)]
pub struct AnalysisService {
    local: Arc<dyn TextClassifier>,
    remote: Arc<dyn RemoteClassifierFactory>,
    cross_referencer: Arc<dyn CrossReferencer>,
}

impl AnalysisService {
    pub fn new(local: Arc<dyn TextClassifier>, remote: Arc<dyn RemoteClassifierFactory>) -> Self {
        Self {
            local,
            remote,
            cross_referencer: Arc::new(MockCrossReferencer),
        }
    }

    pub fn with_cross_referencer(mut self, cross_referencer: Arc<dyn CrossReferencer>) -> Self {
        self.cross_referencer = cross_referencer;
        self
    }

    pub fn local_model_id(&self) -> &str {
        self.local.model_id()
    }

    pub fn remote_model_id(&self) -> &str {
        self.remote.model_id()
    }

    /// Run one request end to end.
    ///
    /// Validation failures return before any classifier is touched. Classifier
    /// failures are passed through unchanged.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse> {
        let (text, backend) = request.into_parts()?;
        let mode = backend.mode();
        let start = Instant::now();

        let classification = match backend {
            Backend::Local => self.local.classify(&text).await?,
            Backend::Remote(api_key) => {
                let remote = self.remote.create(api_key);
                remote.classify(&text).await?
            }
        };

        let cross_check = self.cross_referencer.check(&text);

        tracing::info!(
            backend = mode.as_str(),
            top_label = %classification.top_label,
            confidence = classification.confidence,
            sources = cross_check.verified_by_sources.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "analysis complete"
        );

        Ok(AnalysisResponse::new(classification, cross_check))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, ClassifyError, ValidationError};
    use crate::model::{ClassificationResult, CrossCheckResult, ModelMode};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use secrecy::{ExposeSecret, SecretString};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubClassifier {
        label: &'static str,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl StubClassifier {
        fn new(label: &'static str) -> Self {
            Self { label, calls: AtomicUsize::new(0), seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl TextClassifier for StubClassifier {
        async fn classify(&self, text: &str) -> std::result::Result<ClassificationResult, ClassifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(text.to_string());
            Ok(ClassificationResult {
                top_label: self.label.to_string(),
                confidence: 0.9,
                raw_model_output: None,
                full_score_vector: None,
                rationale: None,
            })
        }

        fn model_id(&self) -> &str {
            "stub"
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl TextClassifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> std::result::Result<ClassificationResult, ClassifyError> {
            Err(ClassifyError::Inference("boom".into()))
        }

        fn model_id(&self) -> &str {
            "failing"
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        created: AtomicUsize,
        keys: Mutex<Vec<String>>,
    }

    impl RemoteClassifierFactory for CountingFactory {
        fn create(&self, api_key: SecretString) -> Box<dyn TextClassifier> {
            self.created.fetch_add(1, Ordering::SeqCst);
            self.keys.lock().unwrap().push(api_key.expose_secret().to_string());
            Box::new(StubClassifier::new("propaganda"))
        }

        fn model_id(&self) -> &str {
            "counting-remote"
        }
    }

    fn service(local: Arc<StubClassifier>, factory: Arc<CountingFactory>) -> AnalysisService {
        AnalysisService::new(local, factory)
    }

    #[tokio::test]
    async fn test_local_mode_uses_shared_classifier() {
        let local = Arc::new(StubClassifier::new("real news"));
        let factory = Arc::new(CountingFactory::default());
        let svc = service(local.clone(), factory.clone());

        let response = svc.analyze(AnalysisRequest::local("A calm local story")).await.unwrap();

        assert_eq!(response.classification().top_label, "real news");
        assert_eq!(response.cross_check().verified_by_sources, vec!["MockNewsSource".to_string()]);
        assert_eq!(local.calls.load(Ordering::SeqCst), 1);
        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_without_key_never_creates_remote() {
        let local = Arc::new(StubClassifier::new("real news"));
        let factory = Arc::new(CountingFactory::default());
        let svc = service(local.clone(), factory.clone());

        for key in [None, Some(String::new()), Some("  ".to_string())] {
            let err = svc
                .analyze(AnalysisRequest::new("story", ModelMode::Remote, key))
                .await
                .unwrap_err();
            assert!(matches!(err, AnalysisError::Validation(ValidationError::MissingApiKey)));
            assert_eq!(err.to_string(), "No Gemini API key provided.");
        }

        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_builds_fresh_classifier_per_request() {
        let local = Arc::new(StubClassifier::new("real news"));
        let factory = Arc::new(CountingFactory::default());
        let svc = service(local.clone(), factory.clone());

        svc.analyze(AnalysisRequest::remote("one", "key-a")).await.unwrap();
        let response = svc.analyze(AnalysisRequest::remote("two", "key-b")).await.unwrap();

        assert_eq!(response.classification().top_label, "propaganda");
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert_eq!(*factory.keys.lock().unwrap(), vec!["key-a".to_string(), "key-b".to_string()]);
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_text_is_trimmed_before_classify_and_check() {
        let local = Arc::new(StubClassifier::new("satire"));
        let factory = Arc::new(CountingFactory::default());
        let svc = service(local.clone(), factory);

        svc.analyze(AnalysisRequest::local("  padded text \n")).await.unwrap();

        assert_eq!(*local.seen.lock().unwrap(), vec!["padded text".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_before_classify() {
        let local = Arc::new(StubClassifier::new("satire"));
        let factory = Arc::new(CountingFactory::default());
        let svc = service(local.clone(), factory);

        let err = svc.analyze(AnalysisRequest::local("   ")).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates() {
        let svc = AnalysisService::new(Arc::new(FailingClassifier), Arc::new(CountingFactory::default()));

        let err = svc.analyze(AnalysisRequest::local("story")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Classification(ClassifyError::Inference(_))));
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_custom_cross_referencer_replaces_mock() {
        struct AlwaysVerified;
        impl CrossReferencer for AlwaysVerified {
            fn check(&self, _text: &str) -> CrossCheckResult {
                CrossCheckResult {
                    verified_by_sources: vec!["Wire".into()],
                    explanation: "ok".into(),
                }
            }
        }

        let svc = service(
            Arc::new(StubClassifier::new("real news")),
            Arc::new(CountingFactory::default()),
        )
        .with_cross_referencer(Arc::new(AlwaysVerified));

        let response = svc.analyze(AnalysisRequest::local("US story")).await.unwrap();
        assert_eq!(response.cross_check().verified_by_sources, vec!["Wire".to_string()]);
    }
}
