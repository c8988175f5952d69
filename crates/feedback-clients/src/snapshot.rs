//! Topic model backed by precomputed clustering output.
//!
//! Clustering itself runs elsewhere; this model replays its results from a
//! JSON snapshot:
//!
//! ```json
//! {
//!   "topics": [
//!     {"id": 0, "name": "0_wait_time", "count": 12,
//!      "terms": [["wait", 0.41], ["queue", 0.22]],
//!      "representative_docs": ["Waited an hour"]}
//!   ],
//!   "hierarchy": [{"topics": [0, 3], "parent_id": 7, "parent_name": "7_service"}],
//!   "assignments": [0, 0, -1]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use feedback_topics::{TopicInfo, TopicModel, TopicsError};
use feedback_types::{ClusterId, HierarchyRow};

use crate::error::ClientError;

/// Most representative docs a model hands out per cluster.
const MAX_REPRESENTATIVE_DOCS: usize = 5;

/// One cluster in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTopic {
    pub id: ClusterId,
    pub name: String,
    pub count: usize,
    #[serde(default)]
    pub terms: Vec<(String, f32)>,
    #[serde(default)]
    pub representative_docs: Vec<String>,
}

/// Serialized clustering output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub topics: Vec<SnapshotTopic>,
    #[serde(default)]
    pub hierarchy: Vec<HierarchyRow>,
    /// Cluster of each input item; empty when not recorded
    #[serde(default)]
    pub assignments: Vec<ClusterId>,
}

/// [`TopicModel`] that replays a [`ModelSnapshot`].
pub struct SnapshotTopicModel {
    snapshot: ModelSnapshot,
    index: HashMap<ClusterId, usize>,
}

impl SnapshotTopicModel {
    /// Wrap an in-memory snapshot.
    pub fn new(snapshot: ModelSnapshot) -> Self {
        let mut index = HashMap::new();
        for (pos, topic) in snapshot.topics.iter().enumerate() {
            index.entry(topic.id).or_insert(pos);
        }
        Self { snapshot, index }
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Load a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let model = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            topics = model.snapshot.topics.len(),
            hierarchy_rows = model.snapshot.hierarchy.len(),
            "Loaded topic model snapshot"
        );
        Ok(model)
    }

    /// The underlying snapshot.
    pub fn snapshot(&self) -> &ModelSnapshot {
        &self.snapshot
    }

    fn topic(&self, cluster_id: ClusterId) -> Option<&SnapshotTopic> {
        self.index
            .get(&cluster_id)
            .and_then(|&pos| self.snapshot.topics.get(pos))
    }
}

impl TopicModel for SnapshotTopicModel {
    fn fit(&mut self, texts: &[String], seed_topics: &[String]) -> Result<(), TopicsError> {
        if !seed_topics.is_empty() {
            debug!(seeds = seed_topics.len(), "Snapshot model ignores seed topics");
        }

        let recorded = self.snapshot.assignments.len();
        if recorded != 0 && recorded != texts.len() {
            return Err(TopicsError::Clustering(format!(
                "snapshot covers {recorded} items but {} were supplied",
                texts.len()
            )));
        }
        Ok(())
    }

    fn topic_info(&self) -> Vec<TopicInfo> {
        self.snapshot
            .topics
            .iter()
            .map(|t| TopicInfo::new(t.id, t.name.clone()))
            .collect()
    }

    fn topic_frequency(&self, cluster_id: ClusterId) -> usize {
        self.topic(cluster_id).map_or(0, |t| t.count)
    }

    fn top_terms(&self, cluster_id: ClusterId) -> Vec<(String, f32)> {
        self.topic(cluster_id)
            .map(|t| t.terms.clone())
            .unwrap_or_default()
    }

    fn representative_docs(&self, cluster_id: ClusterId) -> Vec<String> {
        self.topic(cluster_id)
            .map(|t| {
                t.representative_docs
                    .iter()
                    .take(MAX_REPRESENTATIVE_DOCS)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn hierarchy(&self) -> Vec<HierarchyRow> {
        self.snapshot.hierarchy.clone()
    }

    fn assignments(&self) -> Vec<ClusterId> {
        self.snapshot.assignments.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "topics": [
            {"id": -1, "name": "-1_misc", "count": 4},
            {"id": 0, "name": "0_wait_time", "count": 2,
             "terms": [["wait", 0.4], ["queue", 0.2]],
             "representative_docs": ["a", "b", "c", "d", "e", "f"]},
            {"id": 1, "name": "1_friendly_staff", "count": 1}
        ],
        "hierarchy": [{"topics": [0, 1], "parent_id": 2, "parent_name": "2_service"}],
        "assignments": [0, 0, 1, -1, -1, -1, -1]
    }"#;

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("item {i}")).collect()
    }

    #[test]
    fn test_parse_snapshot() {
        let model = SnapshotTopicModel::from_json(SNAPSHOT).unwrap();
        let ids: Vec<ClusterId> = model.topic_info().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![-1, 0, 1]);
        assert_eq!(model.topic_frequency(0), 2);
        assert_eq!(model.topic_frequency(42), 0);
        assert_eq!(model.top_terms(0)[0], ("wait".to_string(), 0.4));
        assert!(model.top_terms(1).is_empty());
        assert_eq!(model.hierarchy()[0].parent_name, "2_service");
    }

    #[test]
    fn test_representative_docs_capped() {
        let model = SnapshotTopicModel::from_json(SNAPSHOT).unwrap();
        assert_eq!(model.representative_docs(0).len(), 5);
        assert!(model.representative_docs(99).is_empty());
    }

    #[test]
    fn test_fit_checks_item_count() {
        let mut model = SnapshotTopicModel::from_json(SNAPSHOT).unwrap();
        assert!(model.fit(&texts(7), &["service".to_string()]).is_ok());

        let err = model.fit(&texts(3), &[]).unwrap_err();
        assert!(matches!(err, TopicsError::Clustering(_)));
    }

    #[test]
    fn test_fit_without_assignments_accepts_any_input() {
        let mut model = SnapshotTopicModel::new(ModelSnapshot::default());
        assert!(model.fit(&texts(3), &[]).is_ok());
        assert!(model.assignments().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let model = SnapshotTopicModel::load(&path).unwrap();
        assert_eq!(model.snapshot().topics.len(), 3);
        assert_eq!(model.assignments().len(), 7);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(SnapshotTopicModel::load(&path), Err(ClientError::Json(_))));
    }
}
