//! Classification service orchestrating multiple classifiers.

use std::sync::Arc;

use futures::future::join_all;
use tracing::warn;

use crate::classification::Classifier;
use crate::error::Result;
use crate::models::{ClassificationInput, ClassificationResult};

/// Runs all classifiers in parallel and returns all successful results,
/// enabling multi-label classification: an article about misused
/// hurricane relief funds can be flagged by both the corruption and the
/// hurricane-relief classifier.
pub struct ClassificationService {
    classifiers: Vec<Arc<dyn Classifier>>,
}

impl ClassificationService {
    pub fn new(classifiers: Vec<Arc<dyn Classifier>>) -> Self {
        Self { classifiers }
    }

    /// Classify an article with every configured classifier.
    ///
    /// All classifiers start concurrently; the call waits for every one to
    /// finish. A failing classifier is logged and omitted from the result
    /// list; the order of the survivors mirrors the classifier list. An
    /// empty classifier set yields an empty list.
    pub async fn classify(
        &self,
        article: &ClassificationInput,
    ) -> Result<Vec<ClassificationResult>> {
        if self.classifiers.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = join_all(
            self.classifiers
                .iter()
                .map(|classifier| classifier.classify(article)),
        )
        .await;

        let mut results = Vec::with_capacity(outcomes.len());
        for (classifier, outcome) in self.classifiers.iter().zip(outcomes) {
            match outcome {
                Ok(result) => results.push(result),
                Err(err) => {
                    warn!(
                        classifier = classifier.name(),
                        url = %article.url,
                        error_type = err.kind(),
                        error = %err,
                        "Classifier failed, omitting its result"
                    );
                }
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Classifier;
    use crate::error::PipelineError;
    use crate::models::ClassifierType;
    use async_trait::async_trait;

    struct FixedClassifier {
        name: &'static str,
        confidence: f64,
    }

    #[async_trait]
    impl Classifier for FixedClassifier {
        fn name(&self) -> &str {
            self.name
        }

        async fn classify(&self, _article: &ClassificationInput) -> Result<ClassificationResult> {
            ClassificationResult::new(
                true,
                self.confidence,
                "matched",
                vec![],
                ClassifierType::Corruption,
                self.name,
            )
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl Classifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        async fn classify(&self, _article: &ClassificationInput) -> Result<ClassificationResult> {
            Err(PipelineError::Llm("boom".to_string()))
        }
    }

    fn input() -> ClassificationInput {
        ClassificationInput::new(
            "https://example.com/a",
            "Title",
            "news",
            "The Office of the Contractor General has launched a probe into irregularities.",
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn empty_classifier_set_returns_empty() {
        let service = ClassificationService::new(vec![]);
        let results = service.classify(&input()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn gathers_all_results_in_list_order() {
        let service = ClassificationService::new(vec![
            Arc::new(FixedClassifier {
                name: "first",
                confidence: 0.9,
            }),
            Arc::new(FixedClassifier {
                name: "second",
                confidence: 0.4,
            }),
        ]);
        let results = service.classify(&input()).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].model_name, "first");
        assert_eq!(results[1].model_name, "second");
    }

    #[tokio::test]
    async fn failing_classifier_is_omitted() {
        let service = ClassificationService::new(vec![
            Arc::new(FailingClassifier),
            Arc::new(FixedClassifier {
                name: "surviving",
                confidence: 0.8,
            }),
        ]);
        let results = service.classify(&input()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].model_name, "surviving");
    }

    #[tokio::test]
    async fn all_failing_yields_empty_not_error() {
        let service = ClassificationService::new(vec![
            Arc::new(FailingClassifier),
            Arc::new(FailingClassifier),
        ]);
        let results = service.classify(&input()).await.unwrap();
        assert!(results.is_empty());
    }
}
