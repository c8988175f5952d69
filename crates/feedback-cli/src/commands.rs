//! Command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use feedback_clients::{
    ApiClassifier, ApiClassifierConfig, ApiGenerator, ApiGeneratorConfig, SnapshotTopicModel,
};
use feedback_topics::{Collaborators, Pipeline};
use feedback_types::Settings;

/// Placeholder printed instead of configured secrets.
const REDACTED: &str = "<redacted>";

/// CSV column read when none is given.
pub const DEFAULT_COLUMN: &str = "Comments";

/// Layout of an input file, chosen by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `.json`: an array of strings
    Json,
    /// `.csv`: one named column of a table with a header row
    Csv,
    /// Anything else: one item per line
    Lines,
}

impl InputFormat {
    /// Pick the format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => InputFormat::Json,
            Some("csv") => InputFormat::Csv,
            _ => InputFormat::Lines,
        }
    }
}

/// Inputs for one report run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Feedback file
    pub input: PathBuf,
    /// Topic model snapshot
    pub model: PathBuf,
    /// Optional seed topics file
    pub seeds: Option<PathBuf>,
    /// Report path overriding the configured one
    pub output: Option<String>,
    /// Column holding feedback in a CSV input
    pub column: String,
    /// Column holding seed phrases in a CSV seed file
    pub seed_column: String,
}

/// Read one column of a CSV file with a header row.
///
/// The file must exist and carry a `.csv` extension. Empty cells stay as
/// empty strings so row positions are preserved.
pub fn load_csv_column(path: &Path, column: &str) -> Result<Vec<String>> {
    if !path.exists() {
        bail!("CSV file not found: {}", path.display());
    }
    if InputFormat::from_path(path) != InputFormat::Csv {
        bail!("Invalid file type: {} (expected .csv)", path.display());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header in {}", path.display()))?
        .clone();
    let index = headers
        .iter()
        .position(|h| h.trim() == column)
        .with_context(|| {
            format!(
                "Column '{column}' not found in {} (columns: {})",
                path.display(),
                headers.iter().collect::<Vec<_>>().join(", ")
            )
        })?;
    debug!(path = %path.display(), column, index, "Reading CSV column");

    reader
        .records()
        .map(|record| -> Result<String> {
            let record = record
                .with_context(|| format!("Malformed CSV record in {}", path.display()))?;
            Ok(record.get(index).unwrap_or_default().to_string())
        })
        .collect()
}

fn read_items(path: &Path, column: &str, kind: &str) -> Result<Vec<String>> {
    if !path.exists() {
        bail!("{kind} file not found: {}", path.display());
    }

    match InputFormat::from_path(path) {
        InputFormat::Csv => load_csv_column(path, column),
        InputFormat::Json => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {kind} file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON array in {}", path.display()))
        }
        InputFormat::Lines => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {kind} file {}", path.display()))?;
            Ok(content.lines().map(str::to_string).collect())
        }
    }
}

/// Read feedback items from a file.
///
/// The extension picks the layout: `.json` is an array of strings, `.csv`
/// is the named `column`, and anything else is one item per line. Blank
/// items are kept.
pub fn load_feedback(path: &Path, column: &str) -> Result<Vec<String>> {
    read_items(path, column, "Feedback")
}

/// Read seed phrases, laid out like feedback files.
///
/// Phrases are trimmed and blank ones dropped.
pub fn load_seeds(path: &Path, column: &str) -> Result<Vec<String>> {
    Ok(read_items(path, column, "Seed")?
        .iter()
        .map(|seed| seed.trim())
        .filter(|seed| !seed.is_empty())
        .map(str::to_string)
        .collect())
}

fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Build the report for one feedback file and save it.
pub fn run_report(
    config_path: Option<&str>,
    log_level: Option<&str>,
    options: &RunOptions,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level)?;
    if let Some(output) = &options.output {
        settings.output_path = output.clone();
    }
    init_logging(&settings)?;

    let feedback = load_feedback(&options.input, &options.column)?;
    let seed_topics = match &options.seeds {
        Some(path) => load_seeds(path, &options.seed_column)?,
        None => Vec::new(),
    };
    info!(
        items = feedback.len(),
        seeds = seed_topics.len(),
        "Loaded feedback"
    );

    let model =
        SnapshotTopicModel::load(&options.model).context("Failed to load topic model snapshot")?;
    let classifier = ApiClassifier::new(ApiClassifierConfig::from_settings(&settings.classifier))
        .context("Failed to create sentiment classifier")?;
    let generator_config = ApiGeneratorConfig::from_settings(&settings.generator)
        .context("Failed to configure text generator")?;
    let generator =
        ApiGenerator::new(generator_config).context("Failed to create text generator")?;
    info!(generator_model = generator.model(), "Text generator ready");

    let mut pipeline = Pipeline::new(
        Collaborators::new(model, classifier, generator),
        settings.pipeline.clone(),
    )?;

    let report = pipeline
        .run(&feedback, &seed_topics)
        .context("Pipeline run failed")?;
    report
        .save(&settings.output_path)
        .with_context(|| format!("Failed to write report to {}", settings.output_path))?;

    let stats = pipeline.stats();
    println!("Report written to {}", settings.output_path);
    println!("  Run ID:                   {}", pipeline.run_id());
    println!("  Feedback items:           {}", stats.feedback_items);
    println!("  Topics:                   {}", stats.topics);
    println!("  Subtopics:                {}", stats.subtopics);
    println!("  Generation failures:      {}", stats.generation_failures);
    println!("  Classification fallbacks: {}", stats.classification_fallbacks);

    Ok(())
}

/// Print the effective settings as JSON, with secrets redacted.
pub fn show_config(config_path: Option<&str>, log_level: Option<&str>) -> Result<()> {
    let mut settings = load_settings(config_path, log_level)?;
    if settings.generator.api_key.is_some() {
        settings.generator.api_key = Some(REDACTED.to_string());
    }
    if settings.classifier.api_key.is_some() {
        settings.classifier.api_key = Some(REDACTED.to_string());
    }

    let rendered =
        serde_json::to_string_pretty(&settings).context("Failed to render configuration")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_input_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.json")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("a.CSV")), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("a.txt")), InputFormat::Lines);
        assert_eq!(InputFormat::from_path(Path::new("feedback")), InputFormat::Lines);
    }

    #[test]
    fn test_load_feedback_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "feedback.json", r#"["Great product", "", "Needs improvement"]"#);

        let items = load_feedback(&path, DEFAULT_COLUMN).unwrap();
        assert_eq!(items, vec!["Great product", "", "Needs improvement"]);
    }

    #[test]
    fn test_load_feedback_lines_keeps_blank_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "feedback.txt", "Great product\n\nNeeds improvement\n");

        let items = load_feedback(&path, DEFAULT_COLUMN).unwrap();
        assert_eq!(items, vec!["Great product", "", "Needs improvement"]);
    }

    #[test]
    fn test_load_feedback_lines_starting_with_bracket() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "feedback.txt", "[urgent] app crashes\nWorks fine\n");

        let items = load_feedback(&path, DEFAULT_COLUMN).unwrap();
        assert_eq!(items, vec!["[urgent] app crashes", "Works fine"]);
    }

    #[test]
    fn test_load_feedback_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "feedback.json", "[1, 2");

        let err = load_feedback(&path, DEFAULT_COLUMN).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON array"));
    }

    #[test]
    fn test_load_feedback_missing_file() {
        let err = load_feedback(Path::new("/nonexistent/feedback.txt"), DEFAULT_COLUMN).unwrap_err();
        assert!(err.to_string().contains("Feedback file not found"));
    }

    #[test]
    fn test_load_feedback_csv_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "survey.csv",
            "Id,Comments,Rating\n1,\"Fast, friendly staff\",5\n2,,3\n3,\"Said \"\"meh\"\"\",2\n",
        );

        let items = load_feedback(&path, DEFAULT_COLUMN).unwrap();
        assert_eq!(items, vec!["Fast, friendly staff", "", "Said \"meh\""]);
    }

    #[test]
    fn test_load_feedback_csv_other_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.csv", "text,sentiment\nhello,positive\nbye,negative\n");

        assert_eq!(load_feedback(&path, "text").unwrap(), vec!["hello", "bye"]);
    }

    #[test]
    fn test_load_csv_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.csv", "text,sentiment\nhello,positive\n");

        let err = load_feedback(&path, DEFAULT_COLUMN).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Column 'Comments' not found"));
        assert!(message.contains("text, sentiment"));
    }

    #[test]
    fn test_load_csv_column_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv_column(&dir.path().join("missing.csv"), DEFAULT_COLUMN).unwrap_err();
        assert!(err.to_string().starts_with("CSV file not found"));
    }

    #[test]
    fn test_load_csv_column_rejects_other_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.txt", "just some text");

        let err = load_csv_column(&path, DEFAULT_COLUMN).unwrap_err();
        assert!(err.to_string().starts_with("Invalid file type"));
    }

    #[test]
    fn test_load_seeds_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "seeds.txt", "  delivery \n\nprice\n   \n");

        assert_eq!(load_seeds(&path, DEFAULT_COLUMN).unwrap(), vec!["delivery", "price"]);
    }

    #[test]
    fn test_load_seeds_from_csv_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "seeds.csv", "Seed,Owner\n delivery ,ops\n,ops\nprice,sales\n");

        assert_eq!(load_seeds(&path, "Seed").unwrap(), vec!["delivery", "price"]);
    }

    #[test]
    fn test_load_seeds_missing_file() {
        let err = load_seeds(Path::new("/nonexistent/seeds.csv"), "Seed").unwrap_err();
        assert!(err.to_string().contains("Seed file not found"));
    }
}
