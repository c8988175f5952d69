//! Progress reporting for pipeline runs.
//!
//! The pipeline never prints. Stage changes and operator-visible messages
//! go to a [`ProgressSink`] supplied by the caller.

use std::sync::{Mutex, PoisonError};

use tracing::info;

/// Receives progress updates from a pipeline run.
pub trait ProgressSink: Send + Sync {
    /// A new stage has started.
    fn stage(&self, message: &str);

    /// A message worth showing to an operator.
    fn log(&self, message: &str);
}

/// Sink that forwards progress to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn stage(&self, message: &str) {
        info!(stage = message, "Pipeline stage");
    }

    fn log(&self, message: &str) {
        info!("{}", message);
    }
}

/// A recorded progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Stage(String),
    Log(String),
}

/// Sink that keeps every update in memory.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded updates.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded log messages only.
    pub fn logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Log(message) => Some(message),
                ProgressEvent::Stage(_) => None,
            })
            .collect()
    }

    fn push(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl ProgressSink for RecordingProgress {
    fn stage(&self, message: &str) {
        self.push(ProgressEvent::Stage(message.to_string()));
    }

    fn log(&self, message: &str) {
        self.push(ProgressEvent::Log(message.to_string()));
    }
}

impl<P: ProgressSink + ?Sized> ProgressSink for std::sync::Arc<P> {
    fn stage(&self, message: &str) {
        (**self).stage(message)
    }

    fn log(&self, message: &str) {
        (**self).log(message)
    }
}
