//! Human-readable names and summaries via the text generator.
//!
//! Every entity gets at most one generation attempt per call. A failed
//! attempt is reported and leaves the field empty; the report shows the
//! failure sentinel in its place. Entities that already hold a value are
//! skipped, so calling the resolver again only retries earlier failures.

use tracing::{debug, instrument, warn};

use feedback_types::{PipelineConfig, UNASSIGNED_TOPIC};

use crate::error::TopicsError;
use crate::generation::{
    clean_generated_name, subtopic_name_prompt, subtopic_summary_prompt, topic_name_prompt,
    MessageBundle, TextGenerator,
};
use crate::progress::ProgressSink;
use crate::subtopics::SubtopicRegistry;
use crate::topics::TopicRegistry;

/// Outcome counters for a resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Generation calls issued
    pub attempted: usize,
    /// Calls that produced usable text
    pub resolved: usize,
    /// Calls that failed
    pub failed: usize,
    /// Fields left alone because they were already resolved
    pub skipped: usize,
}

impl ResolutionStats {
    /// Add another pass's counters to this one.
    pub fn merge(&mut self, other: ResolutionStats) {
        self.attempted += other.attempted;
        self.resolved += other.resolved;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Fills in resolved names and summaries for topics and subtopics.
pub struct NameResolver<G: TextGenerator> {
    generator: G,
    config: PipelineConfig,
}

impl<G: TextGenerator> NameResolver<G> {
    /// Create a resolver over a generator.
    pub fn new(generator: G, config: PipelineConfig) -> Self {
        Self { generator, config }
    }

    /// Resolve names for every topic lacking one.
    ///
    /// The unassigned bucket is named with its sentinel and never sent to
    /// the generator.
    #[instrument(skip_all, fields(topics = topics.len()))]
    pub fn resolve_topics(
        &self,
        topics: &mut TopicRegistry,
        subtopics: &SubtopicRegistry,
        progress: &dyn ProgressSink,
    ) -> ResolutionStats {
        let mut stats = ResolutionStats::default();

        for topic in topics.iter_mut() {
            if topic.is_resolved() {
                stats.skipped += 1;
                continue;
            }
            if topic.key.is_unassigned() {
                debug!("Naming unassigned bucket without generation");
                topic.resolved_name = Some(UNASSIGNED_TOPIC.to_string());
                continue;
            }

            topic.subtopic_data = topic
                .related_sub_topics
                .iter()
                .filter_map(|id| subtopics.get(*id))
                .map(|s| s.describe())
                .collect();

            let entity = format!("topic '{}'", topic.key);
            let prompt = topic_name_prompt(topic);
            topic.resolved_name =
                self.generate(&entity, prompt, |text| self.clean_label(text), &mut stats, progress);
        }

        stats
    }

    /// Resolve name and summary for every subtopic lacking them.
    ///
    /// Name and summary are independent calls; one failing does not skip
    /// the other.
    #[instrument(skip_all, fields(subtopics = subtopics.len()))]
    pub fn resolve_subtopics(
        &self,
        subtopics: &mut SubtopicRegistry,
        progress: &dyn ProgressSink,
    ) -> ResolutionStats {
        let mut stats = ResolutionStats::default();

        for subtopic in subtopics.iter_mut() {
            if subtopic.is_resolved() {
                stats.skipped += 2;
                continue;
            }

            if subtopic.resolved_name.is_some() {
                stats.skipped += 1;
            } else {
                let entity = format!("subtopic {} name", subtopic.id);
                subtopic.resolved_name = self.generate(
                    &entity,
                    subtopic_name_prompt(subtopic),
                    |text| self.clean_label(text),
                    &mut stats,
                    progress,
                );
            }

            if subtopic.summary.is_some() {
                stats.skipped += 1;
            } else {
                let entity = format!("subtopic {} summary", subtopic.id);
                subtopic.summary = self.generate(
                    &entity,
                    subtopic_summary_prompt(subtopic),
                    |text| text.trim().to_string(),
                    &mut stats,
                    progress,
                );
            }
        }

        stats
    }

    fn clean_label(&self, text: &str) -> String {
        clean_generated_name(text, self.config.max_label_length)
    }

    /// One generation attempt; failures are reported and absorbed.
    ///
    /// The response is cleaned before it is checked, so a reply that cleans
    /// down to nothing counts as a failure.
    fn generate(
        &self,
        entity: &str,
        prompt: String,
        clean: impl Fn(&str) -> String,
        stats: &mut ResolutionStats,
        progress: &dyn ProgressSink,
    ) -> Option<String> {
        stats.attempted += 1;
        let messages = MessageBundle::new(self.config.system_instruction.clone(), prompt);

        let result = self.generator.generate(&messages).and_then(|text| {
            let cleaned = clean(&text);
            if cleaned.is_empty() {
                Err(TopicsError::Generation("empty response".to_string()))
            } else {
                Ok(cleaned)
            }
        });

        match result {
            Ok(text) => {
                stats.resolved += 1;
                debug!(entity, "Generated text");
                Some(text)
            }
            Err(e) => {
                stats.failed += 1;
                warn!(entity, error = %e, "Generation failed");
                progress.log(&format!("Generation failed for {entity}: {e}"));
                None
            }
        }
    }

    /// Release the wrapped generator.
    pub fn into_generator(self) -> G {
        self.generator
    }
}
