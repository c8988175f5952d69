//! Report assembly and CSV output.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use feedback_types::{ReportRow, GENERATION_FAILED, REPORT_COLUMNS, UNASSIGNED_TOPIC};

use crate::error::TopicsError;
use crate::subtopics::SubtopicRegistry;
use crate::topics::TopicRegistry;

/// Tabular report, one row per subtopic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    /// Column headers in output order.
    pub fn columns() -> [&'static str; 5] {
        REPORT_COLUMNS
    }

    /// Report rows in subtopic order.
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the report has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the report as comma-delimited UTF-8 with a header row.
    ///
    /// Every field is quoted and embedded quotes are doubled.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write_record(&mut writer, &REPORT_COLUMNS)?;
        for row in &self.rows {
            write_record(&mut writer, &row.fields())?;
        }
        writer.flush()
    }

    /// Render the CSV output to a string.
    pub fn to_csv_string(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write the CSV report to a file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TopicsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))?;
        info!(path = %path.display(), rows = self.rows.len(), "Report saved");
        Ok(())
    }
}

fn write_record<W: Write, S: AsRef<str>>(writer: &mut W, fields: &[S]) -> io::Result<()> {
    let line = fields
        .iter()
        .map(|f| format!("\"{}\"", f.as_ref().replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{line}")
}

/// Flattens topics and subtopics into report rows.
pub struct ReportAssembler;

impl ReportAssembler {
    /// Build one row per subtopic, in subtopic registry order.
    ///
    /// The parent is the first topic whose related list holds the subtopic.
    /// A subtopic no topic holds reports the unassigned sentinel; any
    /// generated field that failed reports the generation-failure sentinel.
    pub fn assemble(topics: &TopicRegistry, subtopics: &SubtopicRegistry) -> Report {
        let rows = subtopics
            .iter()
            .map(|subtopic| {
                let general_topic = match topics.topic_for(subtopic.id) {
                    Some(topic) => topic.resolved_name.as_deref().unwrap_or(GENERATION_FAILED),
                    None => {
                        debug!(cluster_id = subtopic.id, "Subtopic has no parent topic");
                        UNASSIGNED_TOPIC
                    }
                };

                ReportRow {
                    general_topic: general_topic.to_string(),
                    subtopic: subtopic
                        .resolved_name
                        .clone()
                        .unwrap_or_else(|| GENERATION_FAILED.to_string()),
                    sentiment: subtopic.sentiment.dominant().map(str::to_string),
                    responses: subtopic.count,
                    summary: subtopic
                        .summary
                        .clone()
                        .unwrap_or_else(|| GENERATION_FAILED.to_string()),
                }
            })
            .collect();

        Report { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedback_types::{ClusterId, ParentAssignment, RawCluster, SentimentDistribution, Subtopic};

    /// Entries are `(id, space-separated sentiment labels)`.
    fn subtopics(entries: &[(ClusterId, &str)]) -> SubtopicRegistry {
        let mut registry = SubtopicRegistry::new();
        for (id, labels) in entries {
            let labels: Vec<&str> = labels.split_whitespace().collect();
            let mut sub = Subtopic::from_cluster(
                RawCluster {
                    id: *id,
                    name: format!("{id}_c"),
                    count: labels.len() * 10,
                    tags: Vec::new(),
                    feedback: Vec::new(),
                },
                SentimentDistribution::from_labels(&labels),
            );
            sub.resolved_name = Some(format!("Subtopic {id}"));
            sub.summary = Some(format!("Summary {id}"));
            registry.insert(sub);
        }
        registry
    }

    fn named(name: &str) -> ParentAssignment {
        ParentAssignment::Assigned {
            parent_id: 1,
            parent_name: name.to_string(),
        }
    }

    #[test]
    fn test_report_shape() {
        let subs = subtopics(&[(1, "POSITIVE"), (2, "NEGATIVE NEGATIVE")]);
        let mut topics = TopicRegistry::build(&subs, |_| named("Topic1"));
        for topic in topics.iter_mut() {
            topic.resolved_name = Some("Service".to_string());
        }

        let report = ReportAssembler::assemble(&topics, &subs);

        assert_eq!(report.len(), 2);
        assert_eq!(
            Report::columns(),
            ["General Topic", "Subtopic", "Sentiment", "Number of Responses", "Summary"]
        );
        let row = &report.rows()[1];
        assert_eq!(row.general_topic, "Service");
        assert_eq!(row.subtopic, "Subtopic 2");
        assert_eq!(row.sentiment.as_deref(), Some("NEGATIVE"));
        assert_eq!(row.responses, 20);
        assert_eq!(row.summary, "Summary 2");
    }

    #[test]
    fn test_missing_parent_uses_sentinel() {
        let subs = subtopics(&[(1, "POSITIVE"), (999, "NEUTRAL")]);
        let mut topics = TopicRegistry::build(&subtopics(&[(1, "")]), |_| named("Food"));
        for topic in topics.iter_mut() {
            topic.resolved_name = Some("Food".to_string());
        }

        let report = ReportAssembler::assemble(&topics, &subs);
        assert_eq!(report.rows()[0].general_topic, "Food");
        assert_eq!(report.rows()[1].general_topic, UNASSIGNED_TOPIC);
    }

    #[test]
    fn test_failed_generation_uses_sentinel() {
        let mut subs = subtopics(&[(1, "POSITIVE"), (2, "")]);
        subs.get_mut(2).unwrap().summary = None;
        subs.get_mut(2).unwrap().resolved_name = None;
        let topics = TopicRegistry::build(&subs, |_| named("Topic1"));

        let report = ReportAssembler::assemble(&topics, &subs);
        assert_eq!(report.rows()[0].general_topic, GENERATION_FAILED);
        assert_eq!(report.rows()[0].summary, "Summary 1");
        assert_eq!(report.rows()[1].summary, GENERATION_FAILED);
        assert_eq!(report.rows()[1].subtopic, GENERATION_FAILED);
        assert_eq!(report.rows()[1].sentiment, None);
    }

    #[test]
    fn test_csv_output_quotes_fields() {
        let mut subs = subtopics(&[(1, "POSITIVE")]);
        subs.get_mut(1).unwrap().summary = Some("Fast, \"friendly\" staff".to_string());
        let mut topics = TopicRegistry::build(&subs, |_| named("Topic1"));
        for topic in topics.iter_mut() {
            topic.resolved_name = Some("Service".to_string());
        }

        let csv = ReportAssembler::assemble(&topics, &subs)
            .to_csv_string()
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "\"General Topic\",\"Subtopic\",\"Sentiment\",\"Number of Responses\",\"Summary\""
        );
        assert_eq!(
            lines[1],
            "\"Service\",\"Subtopic 1\",\"POSITIVE\",\"10\",\"Fast, \"\"friendly\"\" staff\""
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("output.csv");
        let subs = subtopics(&[(1, "POSITIVE")]);
        let topics = TopicRegistry::build(&subs, |_| named("Topic1"));

        let report = ReportAssembler::assemble(&topics, &subs);
        report.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, report.to_csv_string().unwrap());
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let report = ReportAssembler::assemble(&TopicRegistry::new(), &SubtopicRegistry::new());
        assert!(report.is_empty());
        assert_eq!(report.to_csv_string().unwrap().lines().count(), 1);
    }

    #[test]
    fn test_write_csv_propagates_writer_errors() {
        struct ClosedPipe;
        impl Write for ClosedPipe {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let subs = subtopics(&[(1, "POSITIVE")]);
        let topics = TopicRegistry::build(&subs, |_| named("Topic1"));
        let report = ReportAssembler::assemble(&topics, &subs);

        let err = report.write_csv(ClosedPipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_subtopic_in_two_topics_uses_first() {
        let subs = subtopics(&[(1, "POSITIVE"), (2, "NEGATIVE")]);
        let mut topics = TopicRegistry::build(&subs, |id| match id {
            1 => named("First"),
            _ => named("Second"),
        });
        for topic in topics.iter_mut() {
            topic.resolved_name = Some(topic.key.to_string());
            topic.related_sub_topics = vec![1, 2];
        }

        let report = ReportAssembler::assemble(&topics, &subs);
        assert_eq!(report.rows()[0].general_topic, "First");
        assert_eq!(report.rows()[1].general_topic, "First");
    }
}
