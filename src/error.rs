//! Error types for the crop advisor

use std::fmt;
use std::path::PathBuf;

/// The three artifacts the advisor is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Scaler,
    LabelEncoder,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::LabelEncoder => "label encoder",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// A file could not be read or parsed.
    #[error("failed to load {artifact} from {}: {reason}", .path.display())]
    ArtifactLoad {
        artifact: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    /// The files parsed, but do not describe the same trained pipeline.
    #[error("incompatible {artifact}: {reason}")]
    IncompatibleArtifacts {
        artifact: ArtifactKind,
        reason: String,
    },

    #[error("{stage} expects {expected} values, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("predicted class index {index} has no label (label encoder knows {classes} classes)")]
    Decode { index: usize, classes: usize },

    #[error("classifier failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AdvisorError {
    pub(crate) fn load(artifact: ArtifactKind, path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        AdvisorError::ArtifactLoad {
            artifact,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn incompatible(artifact: ArtifactKind, reason: impl Into<String>) -> Self {
        AdvisorError::IncompatibleArtifacts {
            artifact,
            reason: reason.into(),
        }
    }

    /// True for failures that come from the artifact set rather than the request.
    pub fn is_artifact_error(&self) -> bool {
        matches!(
            self,
            AdvisorError::ArtifactLoad { .. } | AdvisorError::IncompatibleArtifacts { .. }
        )
    }

    /// Short machine-friendly name, used as a metrics key.
    pub fn kind(&self) -> &'static str {
        match self {
            AdvisorError::ArtifactLoad { .. } | AdvisorError::IncompatibleArtifacts { .. } => {
                "artifact_load"
            }
            AdvisorError::ShapeMismatch { .. } => "shape_mismatch",
            AdvisorError::Decode { .. } => "decode",
            AdvisorError::Inference(_) => "inference",
            AdvisorError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AdvisorError::load(ArtifactKind::Scaler, "artifacts/scaler.json", "missing field `mean`");
        assert_eq!(
            err.to_string(),
            "failed to load scaler from artifacts/scaler.json: missing field `mean`"
        );
        assert!(err.is_artifact_error());

        let err = AdvisorError::ShapeMismatch {
            stage: "inference engine",
            expected: 7,
            actual: 6,
        };
        assert_eq!(err.to_string(), "inference engine expects 7 values, got 6");
        assert_eq!(err.kind(), "shape_mismatch");
        assert!(!err.is_artifact_error());
    }

    #[test]
    fn test_decode_error_kind() {
        let err = AdvisorError::Decode { index: 22, classes: 22 };
        assert_eq!(err.kind(), "decode");
        assert!(err.to_string().contains("22 classes"));
    }
}
