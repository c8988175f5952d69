//! Topic registry.
//!
//! Folds subtopics into topics by their hierarchy parent. Topics appear in
//! the order their first subtopic is met while scanning the subtopic
//! registry, and each topic lists its subtopics in that same order.

use std::collections::HashMap;

use tracing::debug;

use feedback_types::{ClusterId, ParentAssignment, Topic, TopicKey};

use crate::subtopics::SubtopicRegistry;

/// Ordered collection of topics.
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    topics: Vec<Topic>,
}

impl TopicRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group every subtopic under the parent returned by `parent_of`.
    ///
    /// All unassigned subtopics share one bucket topic.
    pub fn build<F>(subtopics: &SubtopicRegistry, parent_of: F) -> Self
    where
        F: Fn(ClusterId) -> ParentAssignment,
    {
        let mut topics: Vec<Topic> = Vec::new();
        let mut positions: HashMap<TopicKey, usize> = HashMap::new();

        for id in subtopics.ids() {
            let key = parent_of(id).into_topic_key();
            match positions.get(&key) {
                Some(&pos) => topics[pos].related_sub_topics.push(id),
                None => {
                    debug!(topic = %key, cluster_id = id, "New topic");
                    positions.insert(key.clone(), topics.len());
                    topics.push(Topic::new(key, id));
                }
            }
        }

        Self { topics }
    }

    /// Find the topic with the given key.
    pub fn get(&self, key: &TopicKey) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.key == key)
    }

    /// Find the first topic containing a subtopic.
    pub fn topic_for(&self, subtopic_id: ClusterId) -> Option<&Topic> {
        self.topics.iter().find(|t| t.contains(subtopic_id))
    }

    /// Iterate topics in first-encountered order.
    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    /// Iterate topics mutably in first-encountered order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Topic> {
        self.topics.iter_mut()
    }

    /// Number of topics.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
