//! Pipeline orchestration and lifecycle.
//!
//! [`Pipeline`] owns the three collaborators and the subtopic/topic
//! registries, and moves through [`PipelineState`] one phase at a time:
//!
//! ```text
//! Unbuilt -> SubtopicsBuilt -> TopicsBuilt -> NamesResolved -> ReportReady
//! ```
//!
//! Calling a phase from the wrong state fails with
//! [`TopicsError::OrderingViolation`] and leaves the pipeline untouched.
//! `resolve_names` may be repeated while names are resolved; it only
//! retries entities whose earlier generation failed.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use ulid::Ulid;

use feedback_types::{ClusterId, PipelineConfig, RawCluster};

use crate::clustering::{ClusteringAdapter, TopicModel};
use crate::error::TopicsError;
use crate::generation::TextGenerator;
use crate::naming::{NameResolver, ResolutionStats};
use crate::progress::{ProgressSink, TracingProgress};
use crate::report::{Report, ReportAssembler};
use crate::sentiment::{SentimentAggregator, SentimentClassifier};
use crate::subtopics::SubtopicRegistry;
use crate::topics::TopicRegistry;

/// Lifecycle state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    /// Nothing built yet
    Unbuilt,
    /// Subtopics registered
    SubtopicsBuilt,
    /// Subtopics grouped into topics
    TopicsBuilt,
    /// Generation pass completed
    NamesResolved,
    /// Report assembled
    ReportReady,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Unbuilt => "unbuilt",
            PipelineState::SubtopicsBuilt => "subtopics-built",
            PipelineState::TopicsBuilt => "topics-built",
            PipelineState::NamesResolved => "names-resolved",
            PipelineState::ReportReady => "report-ready",
        };
        f.write_str(name)
    }
}

/// The external services a pipeline drives.
pub struct Collaborators<M, C, G> {
    /// Topic model
    pub model: M,
    /// Sentiment classifier
    pub classifier: C,
    /// Text generator
    pub generator: G,
}

impl<M, C, G> Collaborators<M, C, G> {
    /// Bundle the collaborators.
    pub fn new(model: M, classifier: C, generator: G) -> Self {
        Self {
            model,
            classifier,
            generator,
        }
    }
}

/// Counters describing a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Feedback items the model was fitted on
    pub feedback_items: usize,
    /// Subtopics registered
    pub subtopics: usize,
    /// Topics built
    pub topics: usize,
    /// Feedback items counted as neutral after a classifier failure
    pub classification_fallbacks: usize,
    /// Generation calls issued
    pub generation_calls: usize,
    /// Generation calls that failed
    pub generation_failures: usize,
}

/// Sequences the build phases over owned collaborators.
pub struct Pipeline<M, C, G>
where
    M: TopicModel,
    C: SentimentClassifier,
    G: TextGenerator,
{
    run_id: Ulid,
    state: PipelineState,
    clustering: ClusteringAdapter<M>,
    classifier: C,
    resolver: NameResolver<G>,
    progress: Box<dyn ProgressSink>,
    subtopics: SubtopicRegistry,
    topics: TopicRegistry,
    report: Option<Report>,
    stats: PipelineStats,
}

impl<M, C, G> Pipeline<M, C, G>
where
    M: TopicModel,
    C: SentimentClassifier,
    G: TextGenerator,
{
    /// Create a pipeline in the `Unbuilt` state.
    pub fn new(
        collaborators: Collaborators<M, C, G>,
        config: PipelineConfig,
    ) -> Result<Self, TopicsError> {
        config.validate().map_err(TopicsError::InvalidConfig)?;

        let Collaborators {
            model,
            classifier,
            generator,
        } = collaborators;

        let run_id = Ulid::new();
        info!(%run_id, "Pipeline created");

        Ok(Self {
            run_id,
            state: PipelineState::Unbuilt,
            clustering: ClusteringAdapter::new(model, config.representative_sample_size),
            classifier,
            resolver: NameResolver::new(generator, config),
            progress: Box::new(TracingProgress),
            subtopics: SubtopicRegistry::new(),
            topics: TopicRegistry::new(),
            report: None,
            stats: PipelineStats::default(),
        })
    }

    /// Replace the progress sink.
    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Identifier of this run, recorded on every log line.
    pub fn run_id(&self) -> Ulid {
        self.run_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Registered subtopics.
    pub fn subtopics(&self) -> &SubtopicRegistry {
        &self.subtopics
    }

    /// Built topics.
    pub fn topics(&self) -> &TopicRegistry {
        &self.topics
    }

    /// The clustering adapter, for membership queries.
    pub fn clustering(&self) -> &ClusteringAdapter<M> {
        &self.clustering
    }

    /// The assembled report, once `ReportReady`.
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Run counters so far.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Fit the topic model and register one subtopic per cluster.
    ///
    /// Allowed only from `Unbuilt`. Empty feedback yields no subtopics.
    #[instrument(skip_all, fields(run_id = %self.run_id, items = feedback.len()))]
    pub fn build_subtopics(
        &mut self,
        feedback: &[String],
        seed_topics: &[String],
    ) -> Result<usize, TopicsError> {
        self.require("build_subtopics", &[PipelineState::Unbuilt])?;
        self.progress.stage("Building text clusters");

        self.clustering.fit(feedback, seed_topics)?;
        self.stats.feedback_items = feedback.len();

        let clusters = self.clustering.clusters();
        self.check_membership(&clusters);

        self.progress.stage("Classifying sentiment");
        let mut aggregator = SentimentAggregator::new(&self.classifier, self.progress.as_ref());
        let registry = SubtopicRegistry::build(clusters, &mut aggregator);
        self.stats.classification_fallbacks = aggregator.fallbacks();

        self.stats.subtopics = registry.len();
        self.subtopics = registry;
        self.state = PipelineState::SubtopicsBuilt;

        info!(subtopics = self.subtopics.len(), "Subtopics built");
        self.progress
            .log(&format!("{} subtopics identified", self.subtopics.len()));
        Ok(self.subtopics.len())
    }

    /// Group subtopics into topics by hierarchy parent.
    ///
    /// Allowed only from `SubtopicsBuilt`.
    #[instrument(skip_all, fields(run_id = %self.run_id))]
    pub fn build_topics(&mut self) -> Result<usize, TopicsError> {
        self.require("build_topics", &[PipelineState::SubtopicsBuilt])?;
        self.progress.stage("Identifying topics");

        let clustering = &self.clustering;
        self.topics = TopicRegistry::build(&self.subtopics, |id| clustering.parent_of(id));
        self.stats.topics = self.topics.len();
        self.state = PipelineState::TopicsBuilt;

        info!(topics = self.topics.len(), "Topics built");
        self.progress
            .log(&format!("{} topics identified", self.topics.len()));
        Ok(self.topics.len())
    }

    /// Generate names for topics, then names and summaries for subtopics.
    ///
    /// Allowed from `TopicsBuilt`, and again from `NamesResolved` to retry
    /// entities whose generation failed.
    #[instrument(skip_all, fields(run_id = %self.run_id))]
    pub fn resolve_names(&mut self) -> Result<ResolutionStats, TopicsError> {
        self.require(
            "resolve_names",
            &[PipelineState::TopicsBuilt, PipelineState::NamesResolved],
        )?;

        self.progress.stage("Building topic names");
        let mut stats =
            self.resolver
                .resolve_topics(&mut self.topics, &self.subtopics, self.progress.as_ref());

        self.progress.stage("Building subtopic information");
        stats.merge(
            self.resolver
                .resolve_subtopics(&mut self.subtopics, self.progress.as_ref()),
        );

        self.stats.generation_calls += stats.attempted;
        self.stats.generation_failures += stats.failed;
        self.state = PipelineState::NamesResolved;

        if stats.failed > 0 {
            warn!(failed = stats.failed, "Some names could not be generated");
        }
        info!(
            attempted = stats.attempted,
            resolved = stats.resolved,
            skipped = stats.skipped,
            "Names resolved"
        );
        Ok(stats)
    }

    /// Flatten topics and subtopics into the report.
    ///
    /// Allowed from `NamesResolved`; from `ReportReady` it returns the
    /// existing report.
    #[instrument(skip_all, fields(run_id = %self.run_id))]
    pub fn assemble_report(&mut self) -> Result<&Report, TopicsError> {
        self.require(
            "assemble_report",
            &[PipelineState::NamesResolved, PipelineState::ReportReady],
        )?;

        if self.state == PipelineState::NamesResolved || self.report.is_none() {
            self.progress.stage("Assembling report");
            let report = ReportAssembler::assemble(&self.topics, &self.subtopics);
            info!(rows = report.len(), "Report assembled");
            self.report = Some(report);
            self.state = PipelineState::ReportReady;
        }

        self.report
            .as_ref()
            .ok_or_else(|| TopicsError::OrderingViolation {
                operation: "assemble_report",
                state: self.state,
            })
    }

    /// Run every remaining phase in order and return the report.
    pub fn run(
        &mut self,
        feedback: &[String],
        seed_topics: &[String],
    ) -> Result<&Report, TopicsError> {
        if self.state == PipelineState::Unbuilt {
            self.build_subtopics(feedback, seed_topics)?;
        }
        if self.state == PipelineState::SubtopicsBuilt {
            self.build_topics()?;
        }
        if self.state == PipelineState::TopicsBuilt {
            self.resolve_names()?;
        }
        self.assemble_report()
    }

    /// Release the collaborators for reuse in another run.
    pub fn dispose(self) -> Collaborators<M, C, G> {
        info!(run_id = %self.run_id, state = %self.state, "Pipeline disposed");
        Collaborators {
            model: self.clustering.into_model(),
            classifier: self.classifier,
            generator: self.resolver.into_generator(),
        }
    }

    fn require(
        &self,
        operation: &'static str,
        allowed: &[PipelineState],
    ) -> Result<(), TopicsError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        error!(operation, state = %self.state, "Pipeline phase invoked out of order");
        Err(TopicsError::OrderingViolation {
            operation,
            state: self.state,
        })
    }

    /// Compare per-cluster membership tallies with reported frequencies.
    fn check_membership(&self, clusters: &[RawCluster]) {
        let assignments = self.clustering.member_assignment();
        if assignments.is_empty() {
            return;
        }

        let mut tally: HashMap<ClusterId, usize> = HashMap::new();
        for id in assignments {
            *tally.entry(id).or_insert(0) += 1;
        }
        for cluster in clusters {
            let members = tally.get(&cluster.id).copied().unwrap_or(0);
            if members != cluster.count {
                warn!(
                    cluster_id = cluster.id,
                    members,
                    reported = cluster.count,
                    "Cluster membership disagrees with reported frequency"
                );
            }
        }
    }
}
