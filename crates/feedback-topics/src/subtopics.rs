//! Subtopic registry.
//!
//! Holds one [`Subtopic`] per non-outlier cluster, keyed by cluster id and
//! iterated in the order the clusters were registered.

use std::collections::HashMap;

use tracing::{debug, warn};

use feedback_types::{ClusterId, RawCluster, Subtopic, OUTLIER_CLUSTER_ID};

use crate::sentiment::{SentimentAggregator, SentimentClassifier};

/// Ordered collection of subtopics keyed by cluster id.
#[derive(Debug, Clone, Default)]
pub struct SubtopicRegistry {
    subtopics: Vec<Subtopic>,
    index: HashMap<ClusterId, usize>,
}

impl SubtopicRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build subtopics from raw clusters.
    ///
    /// The outlier cluster is skipped whatever its size. Sentiment is taken
    /// over each cluster's representative feedback.
    pub fn build<C>(clusters: Vec<RawCluster>, aggregator: &mut SentimentAggregator<'_, C>) -> Self
    where
        C: SentimentClassifier + ?Sized,
    {
        let mut registry = Self::new();
        for cluster in clusters {
            if cluster.id == OUTLIER_CLUSTER_ID {
                debug!(count = cluster.count, "Skipping outlier cluster");
                continue;
            }
            let sentiment = aggregator.distribution(&cluster.feedback);
            registry.insert(Subtopic::from_cluster(cluster, sentiment));
        }
        registry
    }

    /// Register a subtopic. Returns false if its id is already present.
    pub fn insert(&mut self, subtopic: Subtopic) -> bool {
        if self.index.contains_key(&subtopic.id) {
            warn!(cluster_id = subtopic.id, "Subtopic already registered");
            return false;
        }
        self.index.insert(subtopic.id, self.subtopics.len());
        self.subtopics.push(subtopic);
        true
    }

    /// Look up a subtopic by cluster id.
    pub fn get(&self, id: ClusterId) -> Option<&Subtopic> {
        self.index.get(&id).map(|&i| &self.subtopics[i])
    }

    /// Look up a subtopic mutably by cluster id.
    pub fn get_mut(&mut self, id: ClusterId) -> Option<&mut Subtopic> {
        self.index.get(&id).map(|&i| &mut self.subtopics[i])
    }

    /// Iterate subtopics in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Subtopic> {
        self.subtopics.iter()
    }

    /// Iterate subtopics mutably in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Subtopic> {
        self.subtopics.iter_mut()
    }

    /// Cluster ids in registration order.
    pub fn ids(&self) -> Vec<ClusterId> {
        self.subtopics.iter().map(|s| s.id).collect()
    }

    /// Number of subtopics.
    pub fn len(&self) -> usize {
        self.subtopics.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.subtopics.is_empty()
    }
}
