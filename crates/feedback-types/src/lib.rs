//! # feedback-types
//!
//! Shared domain types for the feedback topic pipeline.
//!
//! This crate defines the data structures passed between pipeline phases:
//! - Clusters: raw topic-model output and the cluster hierarchy
//! - Sentiment: per-item labels and per-subtopic distributions
//! - Subtopics and Topics: the two-level hierarchy that gets reported
//! - Report rows: the flattened tabular output
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use feedback_types::{clean_cluster_name, SentimentDistribution};
//!
//! assert_eq!(clean_cluster_name("1_Great_Food"), "Great_Food");
//!
//! let dist = SentimentDistribution::from_labels(["POSITIVE", "POSITIVE", "NEGATIVE"]);
//! assert_eq!(dist.dominant(), Some("POSITIVE"));
//! ```

pub mod cluster;
pub mod config;
pub mod error;
pub mod report;
pub mod sentiment;
pub mod topic;

pub use cluster::{
    clean_cluster_name, ClusterId, HierarchyRow, ParentAssignment, RawCluster, TopicKey,
    OUTLIER_CLUSTER_ID, UNASSIGNED_TOPIC,
};
pub use config::{ClassifierSettings, GeneratorSettings, PipelineConfig, Settings, MAX_SAMPLE_SIZE};
pub use error::FeedbackError;
pub use report::{ReportRow, GENERATION_FAILED, REPORT_COLUMNS};
pub use sentiment::{SentimentDistribution, SentimentScore, NEUTRAL_LABEL};
pub use topic::{Subtopic, Topic};
