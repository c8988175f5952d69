//! Report row type.

use serde::{Deserialize, Serialize};

/// Header of the report, in column order.
pub const REPORT_COLUMNS: [&str; 5] = [
    "General Topic",
    "Subtopic",
    "Sentiment",
    "Number of Responses",
    "Summary",
];

/// Text shown in place of any generated field whose generation failed.
pub const GENERATION_FAILED: &str = "Error generating summary";

/// One row of the report, one per subtopic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Resolved name of the parent topic
    #[serde(rename = "General Topic")]
    pub general_topic: String,
    /// Resolved name of the subtopic
    #[serde(rename = "Subtopic")]
    pub subtopic: String,
    /// Dominant sentiment label, if any feedback was classified
    #[serde(rename = "Sentiment")]
    pub sentiment: Option<String>,
    /// Number of feedback items in the subtopic
    #[serde(rename = "Number of Responses")]
    pub responses: usize,
    /// Resolved summary of the subtopic
    #[serde(rename = "Summary")]
    pub summary: String,
}

impl ReportRow {
    /// Row values as text, in column order.
    pub fn fields(&self) -> [String; 5] {
        [
            self.general_topic.clone(),
            self.subtopic.clone(),
            self.sentiment.clone().unwrap_or_default(),
            self.responses.to_string(),
            self.summary.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_follow_column_order() {
        let row = ReportRow {
            general_topic: "Food".to_string(),
            subtopic: "Portion size".to_string(),
            sentiment: None,
            responses: 12,
            summary: "Portions are small".to_string(),
        };
        assert_eq!(
            row.fields(),
            [
                "Food".to_string(),
                "Portion size".to_string(),
                String::new(),
                "12".to_string(),
                "Portions are small".to_string(),
            ]
        );
    }

    #[test]
    fn test_serialized_keys_match_columns() {
        let row = ReportRow {
            general_topic: "a".to_string(),
            subtopic: "b".to_string(),
            sentiment: Some("POSITIVE".to_string()),
            responses: 1,
            summary: "c".to_string(),
        };
        let value = serde_json::to_value(&row).unwrap();
        for column in REPORT_COLUMNS {
            assert!(value.get(column).is_some(), "missing column {column}");
        }
    }
}
