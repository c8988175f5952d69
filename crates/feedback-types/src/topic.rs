//! Subtopic and topic entities.

use serde::{Deserialize, Serialize};

use crate::cluster::{clean_cluster_name, ClusterId, RawCluster, TopicKey};
use crate::sentiment::SentimentDistribution;

/// The finest-grained reportable cluster of feedback.
///
/// Created once per non-outlier cluster; only the resolved name and
/// summary are filled in afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtopic {
    /// Cluster id (unique)
    pub id: ClusterId,
    /// Cluster name with the numeric prefix removed
    pub name: String,
    /// Number of feedback items in the cluster
    pub count: usize,
    /// Top-ranked terms
    pub tags: Vec<String>,
    /// Representative feedback sample
    pub feedback: Vec<String>,
    /// Sentiment counts over the representative sample
    pub sentiment: SentimentDistribution,
    /// Human-readable name from the text generator
    pub resolved_name: Option<String>,
    /// Human-readable summary from the text generator
    pub summary: Option<String>,
}

impl Subtopic {
    /// Build a subtopic from a raw cluster and its sentiment distribution.
    pub fn from_cluster(cluster: RawCluster, sentiment: SentimentDistribution) -> Self {
        let name = clean_cluster_name(&cluster.name).to_string();
        Self {
            id: cluster.id,
            name,
            count: cluster.count,
            tags: cluster.tags,
            feedback: cluster.feedback,
            sentiment,
            resolved_name: None,
            summary: None,
        }
    }

    /// Check if both generated fields are present.
    pub fn is_resolved(&self) -> bool {
        self.resolved_name.is_some() && self.summary.is_some()
    }

    /// Flattened description used inside generation prompts.
    ///
    /// Deterministic for a given subtopic; whitespace is not significant.
    pub fn describe(&self) -> String {
        let feedback = self
            .feedback
            .iter()
            .map(|fb| format!("  - {fb}"))
            .collect::<Vec<_>>()
            .join("\n");
        let sentiment = self
            .sentiment
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "id: {}\nname: {}\ntags: {}\nfeedback:\n{}\nsentiment: {}",
            self.id,
            self.name,
            self.tags.join(", "),
            feedback,
            sentiment
        )
    }
}

/// A coarse grouping of one or more subtopics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Raw grouping key from the hierarchy
    pub key: TopicKey,
    /// Subtopic ids in first-encountered order (never empty)
    pub related_sub_topics: Vec<ClusterId>,
    /// Human-readable name from the text generator
    pub resolved_name: Option<String>,
    /// Cached subtopic descriptions; recomputed before prompting
    #[serde(default)]
    pub subtopic_data: Vec<String>,
}

impl Topic {
    /// Create a topic holding its first subtopic.
    pub fn new(key: TopicKey, first_subtopic: ClusterId) -> Self {
        Self {
            key,
            related_sub_topics: vec![first_subtopic],
            resolved_name: None,
            subtopic_data: Vec::new(),
        }
    }

    /// Check if this topic contains the given subtopic.
    pub fn contains(&self, subtopic_id: ClusterId) -> bool {
        self.related_sub_topics.contains(&subtopic_id)
    }

    /// Check if the topic already has a resolved name.
    pub fn is_resolved(&self) -> bool {
        self.resolved_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: ClusterId, name: &str) -> RawCluster {
        RawCluster {
            id,
            name: name.to_string(),
            count: 5,
            tags: vec!["ui".to_string(), "layout".to_string()],
            feedback: vec!["Good".to_string(), "Confusing menu".to_string()],
        }
    }

    #[test]
    fn test_subtopic_from_cluster_cleans_name() {
        let dist = SentimentDistribution::from_labels(["POSITIVE", "NEGATIVE"]);
        let sub = Subtopic::from_cluster(raw(1, "1_Great_Food"), dist);
        assert_eq!(sub.id, 1);
        assert_eq!(sub.name, "Great_Food");
        assert_eq!(sub.count, 5);
        assert!(sub.resolved_name.is_none());
        assert!(!sub.is_resolved());
    }

    #[test]
    fn test_describe_contains_components() {
        let dist = SentimentDistribution::from_labels(["POSITIVE", "NEGATIVE"]);
        let sub = Subtopic::from_cluster(raw(7, "7_menu_layout"), dist);
        let text = sub.describe();
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

        assert!(normalized.contains("id: 7"));
        assert!(normalized.contains("name: menu_layout"));
        assert!(normalized.contains("ui, layout"));
        assert!(normalized.contains("Confusing menu"));
        assert!(normalized.contains("POSITIVE: 1"));
        assert_eq!(text, sub.describe());
    }

    #[test]
    fn test_topic_contains() {
        let mut topic = Topic::new(TopicKey::Named("Food".to_string()), 1);
        topic.related_sub_topics.push(2);
        assert!(topic.contains(1));
        assert!(topic.contains(2));
        assert!(!topic.contains(3));
        assert!(!topic.is_resolved());
    }
}
