//! Text generation interface and prompt construction.

use serde::{Deserialize, Serialize};

use feedback_types::{Subtopic, Topic};

use crate::error::TopicsError;

/// A two-part generation request: fixed system instruction plus user prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBundle {
    /// System instruction
    pub system: String,
    /// User prompt
    pub user: String,
}

impl MessageBundle {
    /// Bundle a prompt with a system instruction.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Trait for text generation services.
///
/// Implementations make exactly one attempt per call; retry policy, if any,
/// belongs to the caller.
pub trait TextGenerator: Send + Sync {
    /// Generate text for the given messages.
    fn generate(&self, messages: &MessageBundle) -> Result<String, TopicsError>;
}

/// Prompt asking for a readable name for a topic.
///
/// Uses the topic's cached subtopic descriptions.
pub fn topic_name_prompt(topic: &Topic) -> String {
    let raw_name = topic.key.to_string().replace('_', " ");
    let subtopics = topic.subtopic_data.join("\n\n");

    format!(
        r#"The following subtopics of customer feedback were grouped under the machine-generated topic "{raw_name}".

SUBTOPICS:
{subtopics}

Write a short, human-readable name (2-6 words) for the general topic that covers all of these subtopics.
Respond with ONLY the topic name, nothing else."#
    )
}

/// Prompt asking for a readable name for a subtopic.
pub fn subtopic_name_prompt(subtopic: &Subtopic) -> String {
    let details = subtopic.describe();

    format!(
        r#"Here is a cluster of related customer feedback.

CLUSTER:
{details}

Write a short, human-readable name (2-6 words) describing what this feedback is about.
Respond with ONLY the name, nothing else."#
    )
}

/// Prompt asking for a short summary of a subtopic.
pub fn subtopic_summary_prompt(subtopic: &Subtopic) -> String {
    let details = subtopic.describe();

    format!(
        r#"Here is a cluster of related customer feedback.

CLUSTER:
{details}

Summarize in one or two sentences what respondents are saying, including the overall sentiment.
Respond with ONLY the summary."#
    )
}

/// Clean a generated name: trim, strip surrounding quotes, and cut at a
/// word boundary when longer than `max_len` characters.
pub fn clean_generated_name(response: &str, max_len: usize) -> String {
    let cleaned = response.trim().trim_matches('"').trim_matches('\'').trim();

    if cleaned.chars().count() <= max_len {
        return cleaned.to_string();
    }

    let cut: String = cleaned.chars().take(max_len).collect();
    match cut.rfind(' ') {
        Some(last_space) if last_space > 0 => cut[..last_space].trim_end().to_string(),
        _ => cut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedback_types::{RawCluster, SentimentDistribution, TopicKey};

    fn normalize(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn subtopic(id: i64, name: &str, feedback: &[&str], labels: &[&str]) -> Subtopic {
        Subtopic::from_cluster(
            RawCluster {
                id,
                name: name.to_string(),
                count: feedback.len(),
                tags: vec!["x".to_string()],
                feedback: feedback.iter().map(|s| s.to_string()).collect(),
            },
            SentimentDistribution::from_labels(labels),
        )
    }

    #[test]
    fn test_topic_prompt_contains_name_and_subtopics() {
        let a = subtopic(1, "A", &["ok"], &["POSITIVE"]);
        let b = subtopic(2, "B", &["bad"], &["NEGATIVE"]);
        let mut topic = Topic::new(TopicKey::Named("Main_Topic_1".to_string()), 1);
        topic.related_sub_topics.push(2);
        topic.subtopic_data = vec![a.describe(), b.describe()];

        let prompt = normalize(&topic_name_prompt(&topic));
        assert!(prompt.contains("Main Topic 1"));
        assert!(prompt.contains(&normalize(&a.describe())));
        assert!(prompt.contains(&normalize(&b.describe())));
    }

    #[test]
    fn test_subtopic_prompts_embed_description() {
        let sub = subtopic(3, "3_wait_times", &["Waited an hour"], &["NEGATIVE"]);
        let details = normalize(&sub.describe());

        assert!(normalize(&subtopic_name_prompt(&sub)).contains(&details));
        assert!(normalize(&subtopic_summary_prompt(&sub)).contains(&details));
        assert_ne!(subtopic_name_prompt(&sub), subtopic_summary_prompt(&sub));
    }

    #[test]
    fn test_clean_generated_name() {
        assert_eq!(clean_generated_name("  Delivery Delays  ", 50), "Delivery Delays");
        assert_eq!(clean_generated_name("\"Quoted Name\"", 50), "Quoted Name");
        assert_eq!(clean_generated_name("'Single'", 50), "Single");
    }

    #[test]
    fn test_clean_generated_name_truncates_at_word() {
        let name = clean_generated_name("This is a very long topic name that needs truncation", 20);
        assert!(name.chars().count() <= 20);
        assert_eq!(name, "This is a very long");
    }

    #[test]
    fn test_clean_generated_name_multibyte() {
        let name = clean_generated_name("Lieferverzögerungen überall", 12);
        assert_eq!(name, "Lieferverzög");
    }

    #[test]
    fn test_message_bundle() {
        let bundle = MessageBundle::new("You are a helpful assistant", "Summarize");
        assert_eq!(bundle.system, "You are a helpful assistant");
        assert_eq!(bundle.user, "Summarize");
    }
}
