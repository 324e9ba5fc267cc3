//! Fitted feature scaler
//!
//! Reads the scaler exported from the training pipeline as JSON. Attribute
//! names follow the training library (`mean_`, `scale_`, `var_`, `min_`), so
//! the fitted object can be dumped without renaming.

use crate::error::{AdvisorError, ArtifactKind, Result};
use crate::types::features::{Feature, FEATURE_COUNT};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScalerKind {
    /// `(x - mean) / scale`
    #[default]
    Standard,
    /// `x * scale + min`
    MinMax,
}

/// On-disk layout of the scaler
#[derive(Debug, Deserialize)]
struct ScalerFile {
    #[serde(default)]
    kind: ScalerKind,
    #[serde(default, alias = "mean_")]
    mean: Option<Vec<f64>>,
    #[serde(default, alias = "scale_")]
    scale: Option<Vec<f64>>,
    #[serde(default, alias = "var_")]
    var: Option<Vec<f64>>,
    #[serde(default, alias = "min_")]
    min: Option<Vec<f64>>,
    #[serde(default, alias = "feature_names_in_")]
    feature_names: Option<Vec<String>>,
}

/// Per-feature affine transform: `x * factor + offset`
#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    kind: ScalerKind,
    factor: Vec<f64>,
    offset: Vec<f64>,
}

impl Scaler {
    /// Standardization with the given per-feature mean and standard deviation.
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> std::result::Result<Self, String> {
        if mean.len() != scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            ));
        }
        // A constant feature was fitted with zero spread; it is left unscaled.
        let factor: Vec<f64> = scale
            .iter()
            .map(|&s| if s == 0.0 { 1.0 } else { 1.0 / s })
            .collect();
        let offset = mean.iter().zip(&factor).map(|(m, f)| -m * f).collect();
        Ok(Self {
            kind: ScalerKind::Standard,
            factor,
            offset,
        })
    }

    /// Min-max scaling with the fitted `scale_` and `min_` attributes.
    pub fn min_max(scale: Vec<f64>, min: Vec<f64>) -> std::result::Result<Self, String> {
        if min.len() != scale.len() {
            return Err(format!(
                "min has {} entries but scale has {}",
                min.len(),
                scale.len()
            ));
        }
        Ok(Self {
            kind: ScalerKind::MinMax,
            factor: scale,
            offset: min,
        })
    }

    /// Load a scaler from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AdvisorError::load(ArtifactKind::Scaler, path, e))?;
        let scaler =
            Self::from_json(&contents).map_err(|e| AdvisorError::load(ArtifactKind::Scaler, path, e))?;

        info!(
            path = %path.display(),
            kind = ?scaler.kind,
            features = scaler.n_features(),
            "Scaler loaded"
        );
        Ok(scaler)
    }

    fn from_json(contents: &str) -> std::result::Result<Self, String> {
        let file: ScalerFile = serde_json::from_str(contents).map_err(|e| e.to_string())?;

        if let Some(names) = &file.feature_names {
            let expected: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
            if names.iter().map(String::as_str).ne(expected.iter().copied()) {
                return Err(format!(
                    "fitted on columns {:?}, expected {:?}",
                    names, expected
                ));
            }
        }

        let scaler = match file.kind {
            ScalerKind::Standard => {
                let mean = file.mean.ok_or("missing `mean`")?;
                let scale = match (file.scale, file.var) {
                    (Some(scale), _) => scale,
                    (None, Some(var)) => var.iter().map(|v| v.sqrt()).collect(),
                    (None, None) => return Err("missing `scale` (or `var`)".to_string()),
                };
                Self::standard(mean, scale)?
            }
            ScalerKind::MinMax => {
                let scale = file.scale.ok_or("missing `scale`")?;
                let min = file.min.ok_or("missing `min`")?;
                Self::min_max(scale, min)?
            }
        };

        if scaler.factor.iter().chain(&scaler.offset).any(|v| !v.is_finite()) {
            return Err("parameters contain non-finite values".to_string());
        }
        Ok(scaler)
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }

    /// Number of features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.factor.len()
    }

    /// Scale one row of raw measurements for the classifier.
    pub fn transform(&self, raw: &[f64]) -> Result<Vec<f32>> {
        if raw.len() != self.n_features() {
            return Err(AdvisorError::ShapeMismatch {
                stage: "scaler",
                expected: self.n_features(),
                actual: raw.len(),
            });
        }

        let scaled: Vec<f32> = raw
            .iter()
            .zip(self.factor.iter().zip(&self.offset))
            .map(|(&x, (&f, &o))| (x * f + o) as f32)
            .collect();

        debug!(scaled = ?scaled, "Features scaled");
        Ok(scaled)
    }

    pub(crate) fn check_width(&self) -> Result<()> {
        if self.n_features() != FEATURE_COUNT {
            return Err(AdvisorError::incompatible(
                ArtifactKind::Scaler,
                format!(
                    "fitted on {} features, the classifier input has {}",
                    self.n_features(),
                    FEATURE_COUNT
                ),
            ));
        }
        Ok(())
    }
}
