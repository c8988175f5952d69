//! # feedback-clients
//!
//! Concrete collaborators for the feedback pipeline:
//! - [`ApiGenerator`]: OpenAI-compatible chat completions
//! - [`ApiClassifier`]: hosted text-classification sentiment model
//! - [`SnapshotTopicModel`]: precomputed clustering output loaded from JSON
//!
//! All clients are blocking and make exactly one request per call.

pub mod classifier;
pub mod error;
pub mod generator;
pub mod snapshot;

pub use classifier::{ApiClassifier, ApiClassifierConfig};
pub use error::ClientError;
pub use generator::{ApiGenerator, ApiGeneratorConfig};
pub use snapshot::{ModelSnapshot, SnapshotTopic, SnapshotTopicModel};
