//! # feedback-topics
//!
//! Topic and subtopic reporting over clustered free-text feedback.
//!
//! This crate turns the output of three independent collaborators into one
//! consistent two-level report:
//! - a topic model that clusters feedback and knows a cluster hierarchy
//! - a sentiment classifier that labels individual feedback items
//! - a text generator that writes human-readable names and summaries
//!
//! ## Pipeline
//!
//! Phases run strictly in order and are tracked by [`PipelineState`]:
//!
//! 1. `build_subtopics` - fit the model, one subtopic per non-outlier cluster
//! 2. `build_topics` - group subtopics by their hierarchy parent
//! 3. `resolve_names` - generated names and summaries, failures absorbed
//! 4. `assemble_report` - one row per subtopic
//!
//! Running a phase out of order returns [`TopicsError::OrderingViolation`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feedback_topics::{Collaborators, Pipeline};
//! use feedback_types::PipelineConfig;
//!
//! let collaborators = Collaborators::new(model, classifier, generator);
//! let mut pipeline = Pipeline::new(collaborators, PipelineConfig::default())?;
//! let report = pipeline.run(&feedback, &[])?;
//! report.save("data/output.csv")?;
//! ```

pub mod clustering;
pub mod error;
pub mod generation;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod sentiment;
pub mod subtopics;
pub mod topics;

pub use clustering::{ClusteringAdapter, HierarchyIndex, TopicInfo, TopicModel};
pub use error::TopicsError;
pub use generation::{MessageBundle, TextGenerator};
pub use naming::{NameResolver, ResolutionStats};
pub use pipeline::{Collaborators, Pipeline, PipelineState, PipelineStats};
pub use progress::{ProgressEvent, ProgressSink, RecordingProgress, TracingProgress};
pub use report::{Report, ReportAssembler};
pub use sentiment::{SentimentAggregator, SentimentClassifier};
pub use subtopics::SubtopicRegistry;
pub use topics::TopicRegistry;
