//! Classifier trait and common types

use async_trait::async_trait;
use commentguard_core::ModerationResult;

use crate::category::Category;

/// Trait for safety classifiers.
///
/// A flagged result is an absolute veto over publication.
#[async_trait]
pub trait SafetyClassifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> ModerationResult<Classification>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of safety classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Whether the provider flagged the text overall
    pub flagged: bool,

    /// Categories reported true, in taxonomy order
    pub categories: Vec<Category>,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl Classification {
    /// A result with nothing flagged
    pub fn clean() -> Self {
        Self {
            flagged: false,
            categories: Vec::new(),
            latency_us: 0,
        }
    }

    /// A flagged result. Categories are put in taxonomy order.
    pub fn flagged(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut categories: Vec<Category> = categories.into_iter().collect();
        categories.sort();
        categories.dedup();

        Self {
            flagged: true,
            categories,
            latency_us: 0,
        }
    }

    /// Attach a measured latency
    pub fn with_latency(mut self, latency_us: u64) -> Self {
        self.latency_us = latency_us;
        self
    }

    /// Provider labels of the reported categories
    pub fn labels(&self) -> Vec<&'static str> {
        self.categories.iter().map(Category::label).collect()
    }
}
