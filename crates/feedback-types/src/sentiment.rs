//! Sentiment labels and per-subtopic distributions.

use serde::{Deserialize, Serialize};

/// Label used for blank feedback and for items that could not be classified.
pub const NEUTRAL_LABEL: &str = "NEUTRAL";

/// Output of a sentiment classifier for a single feedback item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Classifier label (e.g. "POSITIVE", "Very Negative")
    pub label: String,
    /// Classifier confidence for the label
    pub score: f32,
}

impl SentimentScore {
    /// Create a new sentiment score.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// Score assigned to blank input without consulting a classifier.
    pub fn neutral() -> Self {
        Self::new(NEUTRAL_LABEL, 0.0)
    }
}

/// Count of sentiment labels across a subtopic's representative feedback.
///
/// Labels keep the order in which they were first observed. Absent labels
/// have no entry; counts are never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentDistribution {
    counts: Vec<(String, usize)>,
}

impl SentimentDistribution {
    /// Create an empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a distribution by counting labels in order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dist = Self::new();
        for label in labels {
            dist.record(label.as_ref());
        }
        dist
    }

    /// Record one occurrence of a label.
    pub fn record(&mut self, label: &str) {
        match self.counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label.to_string(), 1)),
        }
    }

    /// Count for a label, if it was observed.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }

    /// The label with the highest count.
    ///
    /// Ties go to the label observed first. Returns `None` when empty.
    pub fn dominant(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.counts {
            match best {
                Some((_, best_count)) if entry.1 <= *best_count => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(label, _)| label.as_str())
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no labels were recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate labels and counts in first-observed order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(label, count)| (label.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_counts() {
        let dist = SentimentDistribution::from_labels(["POSITIVE", "POSITIVE", "NEGATIVE"]);
        assert_eq!(dist.get("POSITIVE"), Some(2));
        assert_eq!(dist.get("NEGATIVE"), Some(1));
        assert_eq!(dist.get("NEUTRAL"), None);
        assert_eq!(dist.total(), 3);
        assert_eq!(dist.dominant(), Some("POSITIVE"));
    }

    #[test]
    fn test_empty_distribution() {
        let dist = SentimentDistribution::from_labels(Vec::<String>::new());
        assert!(dist.is_empty());
        assert_eq!(dist.total(), 0);
        assert_eq!(dist.dominant(), None);
    }

    #[test]
    fn test_dominant_tie_goes_to_first_observed() {
        let dist = SentimentDistribution::from_labels(["NEGATIVE", "POSITIVE", "POSITIVE", "NEGATIVE"]);
        assert_eq!(dist.dominant(), Some("NEGATIVE"));

        let dist = SentimentDistribution::from_labels(["POSITIVE", "NEGATIVE"]);
        assert_eq!(dist.dominant(), Some("POSITIVE"));
    }

    #[test]
    fn test_iteration_order_is_first_observed() {
        let dist = SentimentDistribution::from_labels(["NEUTRAL", "POSITIVE", "NEUTRAL", "NEGATIVE"]);
        let labels: Vec<&str> = dist.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["NEUTRAL", "POSITIVE", "NEGATIVE"]);
    }

    #[test]
    fn test_distribution_serializes_as_pairs() {
        let dist = SentimentDistribution::from_labels(["POSITIVE", "NEGATIVE"]);
        let json = serde_json::to_string(&dist).unwrap();
        assert_eq!(json, r#"[["POSITIVE",1],["NEGATIVE",1]]"#);
        let decoded: SentimentDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, dist);
    }

    #[test]
    fn test_neutral_score() {
        let score = SentimentScore::neutral();
        assert_eq!(score.label, NEUTRAL_LABEL);
        assert_eq!(score.score, 0.0);
    }
}
