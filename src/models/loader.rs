//! Artifact loading and compatibility checks

use crate::config::ArtifactsConfig;
use crate::error::{AdvisorError, ArtifactKind, Result};
use crate::models::classifier::Classifier;
use crate::models::dense::DenseNetwork;
use crate::models::label_encoder::LabelEncoder;
use crate::models::onnx::OnnxClassifier;
use crate::models::scaler::Scaler;
use crate::types::features::FEATURE_COUNT;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// The trained classifier, its scaler and its label encoder, checked to agree
/// with each other.
pub struct Artifacts {
    classifier: Box<dyn Classifier>,
    scaler: Scaler,
    label_encoder: LabelEncoder,
}

impl Artifacts {
    /// Bundle the three artifacts, rejecting sets that were not trained together
    /// as far as their shapes can tell.
    pub fn new(
        classifier: Box<dyn Classifier>,
        scaler: Scaler,
        label_encoder: LabelEncoder,
    ) -> Result<Self> {
        scaler.check_width()?;

        if let Some(width) = classifier.input_width() {
            if width != FEATURE_COUNT {
                return Err(AdvisorError::incompatible(
                    ArtifactKind::Model,
                    format!("expects {} inputs, the advisor provides {}", width, FEATURE_COUNT),
                ));
            }
        }

        if let Some(classes) = classifier.output_width() {
            if classes != label_encoder.len() {
                return Err(AdvisorError::incompatible(
                    ArtifactKind::LabelEncoder,
                    format!(
                        "model scores {} classes but the label encoder maps {}",
                        classes,
                        label_encoder.len()
                    ),
                ));
            }
        }

        Ok(Self {
            classifier,
            scaler,
            label_encoder,
        })
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }
}

impl fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifacts")
            .field("classifier", &self.classifier.name())
            .field("scaler", &self.scaler.kind())
            .field("classes", &self.label_encoder.len())
            .finish()
    }
}

/// Where artifacts come from. The store calls `load` at most once.
pub trait ArtifactSource: Send + Sync {
    fn load(&self) -> Result<Artifacts>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Artifacts read from three files on disk
#[derive(Debug, Clone)]
pub struct FileArtifactSource {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub label_encoder_path: PathBuf,
    /// Number of threads for ONNX inference
    pub onnx_threads: usize,
}

impl FileArtifactSource {
    pub fn new(
        model_path: impl Into<PathBuf>,
        scaler_path: impl Into<PathBuf>,
        label_encoder_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model_path: model_path.into(),
            scaler_path: scaler_path.into(),
            label_encoder_path: label_encoder_path.into(),
            onnx_threads: 1,
        }
    }

    pub fn from_config(config: &ArtifactsConfig) -> Self {
        Self {
            onnx_threads: config.onnx_threads,
            ..Self::new(
                config.model_path(),
                config.scaler_path(),
                config.label_encoder_path(),
            )
        }
    }
}

impl ArtifactSource for FileArtifactSource {
    fn load(&self) -> Result<Artifacts> {
        let classifier = load_classifier(&self.model_path, self.onnx_threads)?;
        let scaler = Scaler::load(&self.scaler_path)?;
        let label_encoder = LabelEncoder::load(&self.label_encoder_path)?;
        let artifacts = Artifacts::new(classifier, scaler, label_encoder)?;

        info!(
            classifier = artifacts.classifier().name(),
            classes = artifacts.label_encoder().len(),
            "Artifacts loaded from {}",
            self.describe()
        );
        Ok(artifacts)
    }

    fn describe(&self) -> String {
        format!(
            "model={} scaler={} label_encoder={}",
            self.model_path.display(),
            self.scaler_path.display(),
            self.label_encoder_path.display()
        )
    }
}

/// Pick the backend from the file extension.
pub fn load_classifier(path: &Path, onnx_threads: usize) -> Result<Box<dyn Classifier>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("onnx") => Ok(Box::new(OnnxClassifier::load(path, onnx_threads)?)),
        Some("json") => Ok(Box::new(DenseNetwork::load(path)?)),
        _ => Err(AdvisorError::load(
            ArtifactKind::Model,
            path,
            "unsupported model format (expected .onnx or .json)",
        )),
    }
}
