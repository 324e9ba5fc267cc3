//! Class index to crop name mapping fixed at training time

use crate::error::{AdvisorError, ArtifactKind, Result};
use crate::types::recommendation::CropLabel;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct LabelEncoderFile {
    #[serde(alias = "classes_")]
    classes: Vec<String>,
}

/// Immutable ordered mapping from class index to crop label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<CropLabel>,
}

impl LabelEncoder {
    /// Build from class names in index order. Names must be unique and non-empty.
    pub fn new<I, S>(classes: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err("no classes".to_string());
        }

        let mut seen = HashSet::with_capacity(classes.len());
        for name in &classes {
            if name.trim().is_empty() {
                return Err("empty class name".to_string());
            }
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate class `{}`", name));
            }
        }

        Ok(Self {
            classes: classes.into_iter().map(CropLabel::new).collect(),
        })
    }

    /// Load the label encoder from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AdvisorError::load(ArtifactKind::LabelEncoder, path, e))?;
        let file: LabelEncoderFile = serde_json::from_str(&contents)
            .map_err(|e| AdvisorError::load(ArtifactKind::LabelEncoder, path, e))?;
        let encoder = Self::new(file.classes)
            .map_err(|e| AdvisorError::load(ArtifactKind::LabelEncoder, path, e))?;

        info!(
            path = %path.display(),
            classes = encoder.len(),
            "Label encoder loaded"
        );
        Ok(encoder)
    }

    /// Crop label for a class index.
    pub fn inverse_transform(&self, index: usize) -> Result<&CropLabel> {
        self.classes.get(index).ok_or(AdvisorError::Decode {
            index,
            classes: self.classes.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
