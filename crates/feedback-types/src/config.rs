//! Configuration loading for the feedback pipeline.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `<config dir>/feedback-topics/config.toml`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::FeedbackError;

/// Largest representative sample the pipeline will pass to prompts.
pub const MAX_SAMPLE_SIZE: usize = 5;

/// Settings that shape a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Representative feedback items kept per subtopic (1-5)
    #[serde(default = "default_sample_size")]
    pub representative_sample_size: usize,

    /// System instruction sent with every generation request
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    /// Generated names longer than this are cut at a word boundary
    #[serde(default = "default_max_label_length")]
    pub max_label_length: usize,
}

fn default_sample_size() -> usize {
    4
}

fn default_system_instruction() -> String {
    "You are a helpful assistant".to_string()
}

fn default_max_label_length() -> usize {
    80
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            representative_sample_size: default_sample_size(),
            system_instruction: default_system_instruction(),
            max_label_length: default_max_label_length(),
        }
    }
}

impl PipelineConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_SAMPLE_SIZE).contains(&self.representative_sample_size) {
            return Err(format!(
                "representative_sample_size must be 1-{}, got {}",
                MAX_SAMPLE_SIZE, self.representative_sample_size
            ));
        }
        if self.max_label_length == 0 {
            return Err("max_label_length must be > 0".to_string());
        }
        Ok(())
    }
}

/// Text generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// API base URL of an OpenAI-compatible endpoint
    #[serde(default = "default_generator_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_generator_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_generator_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_generator_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            base_url: default_generator_base_url(),
            model: default_generator_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Sentiment classification service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Inference API base URL
    #[serde(default = "default_classifier_base_url")]
    pub base_url: String,

    /// Text-classification model name
    #[serde(default = "default_classifier_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_classifier_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_classifier_model() -> String {
    "tabularisai/multilingual-sentiment-analysis".to_string()
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            base_url: default_classifier_base_url(),
            model: default_classifier_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Where the CSV report is written
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Text generator settings
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Sentiment classifier settings
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_path() -> String {
    "data/output.csv".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_path: default_output_path(),
            pipeline: PipelineConfig::default(),
            generator: GeneratorSettings::default(),
            classifier: ClassifierSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (`<config dir>/feedback-topics/config.toml`)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (`FEEDBACK_*`, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, FeedbackError> {
        let config_dir = ProjectDirs::from("", "", "feedback-topics")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| FeedbackError::Config(e.to_string()))?
            .set_default("output_path", default_output_path())
            .map_err(|e| FeedbackError::Config(e.to_string()))?
            .set_default("generator.model", default_generator_model())
            .map_err(|e| FeedbackError::Config(e.to_string()))?
            .set_default("classifier.model", default_classifier_model())
            .map_err(|e| FeedbackError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // FEEDBACK_LOG_LEVEL, FEEDBACK_GENERATOR__API_KEY, ...
        builder = builder.add_source(
            Environment::with_prefix("FEEDBACK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| FeedbackError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| FeedbackError::Config(e.to_string()))?;

        settings.pipeline.validate().map_err(FeedbackError::Config)?;
        Ok(settings)
    }
}
