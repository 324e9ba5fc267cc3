//! Configuration management for the crop advisor

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How recommendations are printed
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON document per recommendation
    Json,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Locations of the trained artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory the file names below are relative to
    pub dir: String,
    /// Classifier file (`.onnx` or `.json`)
    pub model: String,
    /// Fitted scaler
    pub scaler: String,
    /// Fitted label encoder
    pub label_encoder: String,
    /// Number of threads for ONNX inference (default: 1)
    pub onnx_threads: usize,
}

impl ArtifactsConfig {
    pub fn model_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.model)
    }

    pub fn scaler_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.scaler)
    }

    pub fn label_encoder_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.label_encoder)
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: "artifacts".to_string(),
            model: "crop_recommendation_model.onnx".to_string(),
            scaler: "scaler.json".to_string(),
            label_encoder: "label_encoder.json".to_string(),
            onnx_threads: 1,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Runner-up crops shown next to the recommendation
    pub alternatives: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            alternatives: 2,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/config.toml`, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path. A missing file yields defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(
            config.artifacts.model_path(),
            Path::new("artifacts").join("crop_recommendation_model.onnx")
        );
        assert_eq!(config.artifacts.onnx_threads, 1);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.output.alternatives, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config.artifacts.scaler, "scaler.json");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_overrides() {
        let path = std::env::temp_dir().join(format!("crop-advisor-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[artifacts]\ndir = \"models\"\nmodel = \"crops.json\"\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.artifacts.model_path(), Path::new("models").join("crops.json"));
        assert_eq!(config.artifacts.label_encoder, "label_encoder.json");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.alternatives, 2);
    }

    #[test]
    fn test_shipped_config_uses_reference_artifacts() {
        let config =
            AppConfig::load_from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/config/config.toml"))
                .unwrap();
        assert_eq!(
            config.artifacts.model_path(),
            Path::new("tests/fixtures").join("crop_model.json")
        );
        assert_eq!(config.artifacts.scaler, "scaler.json");
        assert_eq!(config.artifacts.label_encoder, "label_encoder.json");
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.logging.format, "pretty");
    }
}
