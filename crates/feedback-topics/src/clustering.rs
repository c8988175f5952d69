//! Clustering adapter over a fitted topic model.
//!
//! The topic model itself is an external collaborator behind [`TopicModel`].
//! [`ClusteringAdapter`] owns it, fits it once, and exposes the view the
//! rest of the pipeline needs: per-cluster summaries with a bounded
//! feedback sample, per-item assignments, and parent lookups through a
//! precomputed [`HierarchyIndex`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use feedback_types::{ClusterId, HierarchyRow, ParentAssignment, RawCluster, OUTLIER_CLUSTER_ID};

use crate::error::TopicsError;

/// One entry of the model's topic table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicInfo {
    /// Cluster id
    pub id: ClusterId,
    /// Machine-derived cluster name
    pub name: String,
}

impl TopicInfo {
    /// Create a topic table entry.
    pub fn new(id: ClusterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Trait for topic-modeling engines.
///
/// Implementations own their fitted state. Query methods are only called
/// after a successful [`fit`](TopicModel::fit).
pub trait TopicModel: Send + Sync {
    /// Fit the model to the feedback texts, optionally guided by seed phrases.
    fn fit(&mut self, texts: &[String], seed_topics: &[String]) -> Result<(), TopicsError>;

    /// Topic table in the model's order, including the outlier cluster.
    fn topic_info(&self) -> Vec<TopicInfo>;

    /// Number of items assigned to a cluster.
    fn topic_frequency(&self, cluster_id: ClusterId) -> usize;

    /// Ranked `(term, weight)` pairs for a cluster, highest weight first.
    fn top_terms(&self, cluster_id: ClusterId) -> Vec<(String, f32)>;

    /// Representative member texts for a cluster (at most five).
    fn representative_docs(&self, cluster_id: ClusterId) -> Vec<String>;

    /// Hierarchy rows in their declared order.
    fn hierarchy(&self) -> Vec<HierarchyRow>;

    /// Cluster id of every input item, in input order.
    fn assignments(&self) -> Vec<ClusterId>;
}

/// Precomputed cluster id -> parent lookup.
///
/// Built in the hierarchy's row order; when an id appears in several rows
/// the first row wins.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    parents: HashMap<ClusterId, (ClusterId, String)>,
}

impl HierarchyIndex {
    /// Build the index from hierarchy rows.
    pub fn build(rows: &[HierarchyRow]) -> Self {
        let mut parents = HashMap::new();
        for row in rows {
            for &cluster_id in &row.topics {
                if parents.contains_key(&cluster_id) {
                    debug!(
                        cluster_id,
                        parent = %row.parent_name,
                        "Cluster already covered by an earlier hierarchy row"
                    );
                    continue;
                }
                parents.insert(cluster_id, (row.parent_id, row.parent_name.clone()));
            }
        }
        Self { parents }
    }

    /// Look up the parent of a cluster.
    pub fn parent_of(&self, cluster_id: ClusterId) -> ParentAssignment {
        match self.parents.get(&cluster_id) {
            Some((parent_id, parent_name)) => ParentAssignment::Assigned {
                parent_id: *parent_id,
                parent_name: parent_name.clone(),
            },
            None => ParentAssignment::Unassigned,
        }
    }

    /// Number of indexed clusters.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Read-only view over a topic model for the rest of the pipeline.
pub struct ClusteringAdapter<M: TopicModel> {
    model: M,
    fitted: bool,
    sample_size: usize,
    hierarchy: HierarchyIndex,
}

impl<M: TopicModel> ClusteringAdapter<M> {
    /// Wrap an unfitted model.
    ///
    /// `sample_size` bounds the representative feedback kept per cluster.
    pub fn new(model: M, sample_size: usize) -> Self {
        Self {
            model,
            fitted: false,
            sample_size,
            hierarchy: HierarchyIndex::default(),
        }
    }

    /// Fit the model and index its hierarchy.
    ///
    /// Empty input leaves the model unfitted; every query then returns an
    /// empty result instead of failing.
    pub fn fit(&mut self, texts: &[String], seed_topics: &[String]) -> Result<(), TopicsError> {
        if texts.is_empty() {
            warn!("No feedback to cluster, topic model left unfitted");
            self.fitted = false;
            self.hierarchy = HierarchyIndex::default();
            return Ok(());
        }

        self.model.fit(texts, seed_topics)?;
        self.hierarchy = HierarchyIndex::build(&self.model.hierarchy());
        self.fitted = true;

        info!(
            items = texts.len(),
            seeds = seed_topics.len(),
            indexed_clusters = self.hierarchy.len(),
            "Topic model fitted"
        );
        Ok(())
    }

    /// Check if a model has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// All non-outlier clusters, in the model's topic-table order.
    ///
    /// Each id appears once; a repeated table entry is ignored.
    pub fn clusters(&self) -> Vec<RawCluster> {
        if !self.fitted {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut clusters = Vec::new();
        for info in self.model.topic_info() {
            if info.id == OUTLIER_CLUSTER_ID {
                continue;
            }
            if !seen.insert(info.id) {
                warn!(cluster_id = info.id, "Duplicate cluster in topic table, ignoring");
                continue;
            }

            let tags = self
                .model
                .top_terms(info.id)
                .into_iter()
                .map(|(term, _)| term)
                .collect();
            let feedback = self
                .model
                .representative_docs(info.id)
                .into_iter()
                .take(self.sample_size)
                .collect();

            clusters.push(RawCluster {
                id: info.id,
                name: info.name,
                count: self.model.topic_frequency(info.id),
                tags,
                feedback,
            });
        }
        clusters
    }

    /// Cluster id of every input item, in input order.
    pub fn member_assignment(&self) -> Vec<ClusterId> {
        if !self.fitted {
            return Vec::new();
        }
        self.model.assignments()
    }

    /// Cluster id of a single input item.
    pub fn cluster_of(&self, item_index: usize) -> Option<ClusterId> {
        self.member_assignment().get(item_index).copied()
    }

    /// Parent of a cluster in the hierarchy.
    pub fn parent_of(&self, cluster_id: ClusterId) -> ParentAssignment {
        self.hierarchy.parent_of(cluster_id)
    }

    /// Release the wrapped model.
    pub fn into_model(self) -> M {
        self.model
    }
}
