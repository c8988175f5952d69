//! Raw clustering output and hierarchy types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a cluster by the topic model.
pub type ClusterId = i64;

/// Reserved id for items the topic model could not group.
///
/// Never produces a subtopic.
pub const OUTLIER_CLUSTER_ID: ClusterId = -1;

/// Sentinel name for the bucket collecting subtopics with no parent.
pub const UNASSIGNED_TOPIC: &str = "unassigned";

/// A cluster as reported by the topic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCluster {
    /// Cluster id (never the outlier id once it leaves the adapter)
    pub id: ClusterId,
    /// Machine-derived name, usually prefixed with the id ("3_slow_checkout")
    pub name: String,
    /// Number of feedback items assigned to the cluster
    pub count: usize,
    /// Top-ranked terms, highest weight first
    pub tags: Vec<String>,
    /// Bounded sample of member texts
    pub feedback: Vec<String>,
}

/// One row of the cluster hierarchy: a set of fine clusters and their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyRow {
    /// Cluster ids covered by this row
    pub topics: Vec<ClusterId>,
    /// Parent cluster id
    pub parent_id: ClusterId,
    /// Parent cluster name, used as the topic grouping key
    pub parent_name: String,
}

impl HierarchyRow {
    /// Create a new hierarchy row.
    pub fn new(topics: Vec<ClusterId>, parent_id: ClusterId, parent_name: impl Into<String>) -> Self {
        Self {
            topics,
            parent_id,
            parent_name: parent_name.into(),
        }
    }
}

/// Result of looking a cluster up in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentAssignment {
    /// The cluster is covered by a hierarchy row
    Assigned {
        parent_id: ClusterId,
        parent_name: String,
    },
    /// No hierarchy row covers the cluster
    Unassigned,
}

impl ParentAssignment {
    /// Convert into the key used to group subtopics into topics.
    pub fn into_topic_key(self) -> TopicKey {
        match self {
            ParentAssignment::Assigned { parent_name, .. } => TopicKey::Named(parent_name),
            ParentAssignment::Unassigned => TopicKey::Unassigned,
        }
    }
}

/// Raw grouping key of a topic.
///
/// Kept as an enum so a parent literally named "unassigned" is never
/// merged with the unassigned bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopicKey {
    /// Parent name from the hierarchy
    Named(String),
    /// Catch-all bucket for subtopics with no hierarchy row
    Unassigned,
}

impl TopicKey {
    /// Check if this is the unassigned bucket.
    pub fn is_unassigned(&self) -> bool {
        matches!(self, TopicKey::Unassigned)
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicKey::Named(name) => f.write_str(name),
            TopicKey::Unassigned => f.write_str(UNASSIGNED_TOPIC),
        }
    }
}

/// Strip the leading run of digits, hyphens and underscores from a raw
/// cluster name.
///
/// Only the leading run is removed; the rest of the name is untouched.
pub fn clean_cluster_name(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_cluster_name_strips_prefix() {
        assert_eq!(clean_cluster_name("1_Great_Food"), "Great_Food");
        assert_eq!(clean_cluster_name("12_slow_checkout"), "slow_checkout");
        assert_eq!(clean_cluster_name("-1_outliers"), "outliers");
    }

    #[test]
    fn test_clean_cluster_name_only_leading_run() {
        assert_eq!(clean_cluster_name("3_covid_19_rules"), "covid_19_rules");
        assert_eq!(clean_cluster_name("Great_Food"), "Great_Food");
        assert_eq!(clean_cluster_name("Topic A"), "Topic A");
        assert_eq!(clean_cluster_name(""), "");
        assert_eq!(clean_cluster_name("123"), "");
    }

    #[test]
    fn test_parent_assignment_topic_key() {
        let assigned = ParentAssignment::Assigned {
            parent_id: 10,
            parent_name: "Service".to_string(),
        };
        assert_eq!(assigned.into_topic_key(), TopicKey::Named("Service".to_string()));
        assert_eq!(ParentAssignment::Unassigned.into_topic_key(), TopicKey::Unassigned);
    }

    #[test]
    fn test_topic_key_display() {
        assert_eq!(TopicKey::Named("Food".to_string()).to_string(), "Food");
        assert_eq!(TopicKey::Unassigned.to_string(), "unassigned");
        assert_ne!(
            TopicKey::Named(UNASSIGNED_TOPIC.to_string()),
            TopicKey::Unassigned
        );
    }
}
