//! End-to-end test infrastructure for the feedback pipeline.
//!
//! Provides a shared TestHarness, a small restaurant-review dataset with its
//! clustering snapshot, and scripted classifier/generator collaborators
//! whose output can be predicted from the prompt alone.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use feedback_clients::{ModelSnapshot, SnapshotTopic, SnapshotTopicModel};
use feedback_topics::{
    Collaborators, MessageBundle, Pipeline, SentimentClassifier, TextGenerator, TopicsError,
};
use feedback_types::{HierarchyRow, PipelineConfig, SentimentScore};

/// Pipeline type used across the e2e tests.
pub type TestPipeline = Pipeline<SnapshotTopicModel, KeywordClassifier, EchoGenerator>;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Where reports are written
    pub output_path: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with a temp directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let output_path = temp_dir.path().join("reports").join("output.csv");
        Self {
            _temp_dir: temp_dir,
            output_path,
        }
    }

    /// Write a snapshot to the temp dir and return its path.
    pub fn write_snapshot(&self, snapshot: &ModelSnapshot) -> PathBuf {
        let path = self._temp_dir.path().join("model.json");
        let json = serde_json::to_string_pretty(snapshot).expect("Failed to serialize snapshot");
        std::fs::write(&path, json).expect("Failed to write snapshot");
        path
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Eight restaurant reviews, in input order.
pub fn sample_feedback() -> Vec<String> {
    [
        "The food was delicious",
        "Loved the pasta",
        "Waited forty minutes for a table",
        "Service was slow",
        "Staff were friendly",
        "",
        "Parking was impossible",
        "asdf",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn topic(id: i64, name: &str, count: usize, docs: &[&str]) -> SnapshotTopic {
    SnapshotTopic {
        id,
        name: name.to_string(),
        count,
        terms: name
            .split('_')
            .skip(1)
            .map(|t| (t.to_string(), 0.5))
            .collect(),
        representative_docs: docs.iter().map(|d| d.to_string()).collect(),
    }
}

/// Clustering output for [`sample_feedback`].
///
/// Clusters 0 (food) and 1, 2 (service) have parents; cluster 3 (parking)
/// is covered by no hierarchy row.
pub fn sample_snapshot() -> ModelSnapshot {
    ModelSnapshot {
        topics: vec![
            topic(-1, "-1_misc", 2, &["", "asdf"]),
            topic(0, "0_food_taste", 2, &["The food was delicious", "Loved the pasta"]),
            topic(
                1,
                "1_wait_time",
                2,
                &["Waited forty minutes for a table", "Service was slow"],
            ),
            topic(2, "2_friendly_staff", 1, &["Staff were friendly"]),
            topic(3, "3_parking", 1, &["Parking was impossible"]),
        ],
        hierarchy: vec![
            HierarchyRow::new(vec![0], 10, "10_food"),
            HierarchyRow::new(vec![1, 2], 11, "11_service"),
        ],
        assignments: vec![0, 0, 1, 1, 2, -1, 3, -1],
    }
}

/// Build a pipeline over the sample snapshot.
pub fn build_pipeline(classifier: KeywordClassifier, generator: EchoGenerator) -> TestPipeline {
    Pipeline::new(
        Collaborators::new(
            SnapshotTopicModel::new(sample_snapshot()),
            classifier,
            generator,
        ),
        PipelineConfig::default(),
    )
    .expect("Failed to create pipeline")
}

/// Classifier labelling by keyword.
///
/// Text listed in `failing` produces an error.
pub struct KeywordClassifier {
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl KeywordClassifier {
    const POSITIVE: [&'static str; 3] = ["delicious", "Loved", "friendly"];
    const NEGATIVE: [&'static str; 3] = ["Waited", "slow", "impossible"];

    pub fn new() -> Self {
        Self {
            failing: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail for exactly these texts.
    pub fn failing_on(texts: &[&str]) -> Self {
        Self {
            failing: texts.iter().map(|t| t.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of classify calls made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<SentimentScore, TopicsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|f| f == text) {
            return Err(TopicsError::Classification("classifier offline".to_string()));
        }
        let label = if Self::POSITIVE.iter().any(|k| text.contains(k)) {
            "POSITIVE"
        } else if Self::NEGATIVE.iter().any(|k| text.contains(k)) {
            "NEGATIVE"
        } else {
            "NEUTRAL"
        };
        Ok(SentimentScore::new(label, 0.9))
    }
}

/// Generator whose answers are derived from the prompt.
///
/// - topic prompts answer `Topic <raw topic name>`
/// - subtopic name prompts answer `Subtopic <cleaned name>`
/// - summary prompts answer `Summary of <cleaned name>`
///
/// A failure rule is a set of markers; a prompt containing every marker
/// of any rule fails.
pub struct EchoGenerator {
    rules: Mutex<Vec<Vec<String>>>,
    prompts: Mutex<Vec<MessageBundle>>,
}

impl EchoGenerator {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail every prompt containing all of `markers`.
    pub fn failing_on(self, markers: &[&str]) -> Self {
        self.rules
            .lock()
            .expect("rules lock")
            .push(markers.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Fail every call.
    pub fn unavailable() -> Self {
        Self::new().failing_on(&[])
    }

    /// Drop all failure rules.
    pub fn recover(&self) {
        self.rules.lock().expect("rules lock").clear();
    }

    /// Number of generate calls made.
    pub fn calls(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }

    /// Every request received, in order.
    pub fn prompts(&self) -> Vec<MessageBundle> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    fn subtopic_name(prompt: &str) -> String {
        prompt
            .lines()
            .find_map(|line| line.trim().strip_prefix("name: "))
            .unwrap_or("?")
            .to_string()
    }

    fn topic_name(prompt: &str) -> String {
        prompt.split('"').nth(1).unwrap_or("?").to_string()
    }
}

impl Default for EchoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for EchoGenerator {
    fn generate(&self, messages: &MessageBundle) -> Result<String, TopicsError> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(messages.clone());

        let prompt = &messages.user;
        let failing = self
            .rules
            .lock()
            .expect("rules lock")
            .iter()
            .any(|rule| rule.iter().all(|m| prompt.contains(m.as_str())));
        if failing {
            return Err(TopicsError::Generation("service unavailable".to_string()));
        }

        if prompt.contains("machine-generated topic") {
            Ok(format!("Topic {}", Self::topic_name(prompt)))
        } else if prompt.contains("Summarize") {
            Ok(format!("Summary of {}", Self::subtopic_name(prompt)))
        } else {
            Ok(format!("Subtopic {}", Self::subtopic_name(prompt)))
        }
    }
}
