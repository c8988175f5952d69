//! Sentiment classification and aggregation.

use tracing::{debug, warn};

use feedback_types::{SentimentDistribution, SentimentScore};

use crate::error::TopicsError;
use crate::progress::ProgressSink;

/// Trait for sentiment classifiers.
///
/// Implementations label one feedback item per call.
pub trait SentimentClassifier: Send + Sync {
    /// Classify a single, non-blank feedback item.
    fn classify(&self, text: &str) -> Result<SentimentScore, TopicsError>;
}

/// Turns a subtopic's representative feedback into a sentiment distribution.
///
/// Blank items are counted as neutral without calling the classifier. An
/// item the classifier fails on is reported and also counted as neutral,
/// so the distribution always sums to the number of items.
pub struct SentimentAggregator<'a, C: SentimentClassifier + ?Sized> {
    classifier: &'a C,
    progress: &'a dyn ProgressSink,
    fallbacks: usize,
}

impl<'a, C: SentimentClassifier + ?Sized> SentimentAggregator<'a, C> {
    /// Create an aggregator over a classifier.
    pub fn new(classifier: &'a C, progress: &'a dyn ProgressSink) -> Self {
        Self {
            classifier,
            progress,
            fallbacks: 0,
        }
    }

    /// Count labels into a distribution.
    pub fn aggregate<I, S>(labels: I) -> SentimentDistribution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SentimentDistribution::from_labels(labels)
    }

    /// Classify one item, short-circuiting blank text.
    pub fn classify(&mut self, text: &str) -> SentimentScore {
        if text.trim().is_empty() {
            return SentimentScore::neutral();
        }

        match self.classifier.classify(text) {
            Ok(score) => score,
            Err(e) => {
                self.fallbacks += 1;
                warn!(error = %e, "Sentiment classification failed, counting as neutral");
                self.progress
                    .log(&format!("Sentiment classification failed: {e}"));
                SentimentScore::neutral()
            }
        }
    }

    /// Classify every item and count the labels.
    pub fn distribution(&mut self, feedback: &[String]) -> SentimentDistribution {
        let labels: Vec<String> = feedback
            .iter()
            .map(|fb| self.classify(fb).label)
            .collect();
        let dist = Self::aggregate(&labels);
        debug!(items = feedback.len(), labels = dist.len(), "Sentiment aggregated");
        dist
    }

    /// Number of items counted as neutral because classification failed.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }
}
