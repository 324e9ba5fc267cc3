//! Crop inference engine: scale, classify, decode

use crate::error::{AdvisorError, Result};
use crate::models::classifier::{argmax, ranked};
use crate::models::loader::Artifacts;
use crate::models::store::ArtifactStore;
use crate::types::features::{FeatureVector, FEATURE_COUNT};
use crate::types::recommendation::{ClassScore, CropLabel, Recommendation};
use tracing::{debug, warn};

/// Raw output of one classifier run
#[derive(Debug, Clone)]
pub struct PredictionResult {
    /// Winning class index
    pub class_index: usize,
    /// Decoded crop
    pub crop: CropLabel,
    /// Per-class scores, in label encoder order
    pub scores: Vec<f32>,
}

/// Stateless inference over cached artifacts
pub struct InferenceEngine {
    store: ArtifactStore,
    /// Runner-up crops included in a recommendation
    alternatives: usize,
}

impl InferenceEngine {
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            alternatives: 2,
        }
    }

    pub fn with_alternatives(mut self, alternatives: usize) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Force the one-time artifact load.
    pub fn warm_up(&self) -> Result<&Artifacts> {
        self.store.get()
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_loaded()
    }

    /// Crop for seven raw measurements in classifier order.
    pub fn predict(&self, features: &[f64]) -> Result<CropLabel> {
        Ok(self.run(features)?.crop)
    }

    /// Full recommendation for one request.
    pub fn recommend(&self, features: &FeatureVector) -> Result<Recommendation> {
        let out_of_range = features.out_of_range();
        if !out_of_range.is_empty() {
            warn!(features = ?out_of_range, "Measurements outside documented sensor range");
        }

        let result = self.run(&features.to_array())?;
        let labels = self.store.get()?.label_encoder();

        let alternatives = ranked(&result.scores)
            .into_iter()
            .filter(|&i| i != result.class_index)
            .take(self.alternatives)
            .map(|i| {
                Ok(ClassScore {
                    crop: labels.inverse_transform(i)?.clone(),
                    class_index: i,
                    score: result.scores[i],
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let confidence = result.scores[result.class_index];
        Ok(
            Recommendation::new(result.crop, result.class_index, confidence, *features)
                .with_alternatives(alternatives),
        )
    }

    /// Scale, classify and decode one row.
    pub fn run(&self, features: &[f64]) -> Result<PredictionResult> {
        if features.len() != FEATURE_COUNT {
            return Err(AdvisorError::ShapeMismatch {
                stage: "inference engine",
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }

        let artifacts = self.store.get()?;

        let scaled = artifacts.scaler().transform(features)?;
        let scores = artifacts.classifier().predict(&scaled)?;
        let class_index = argmax(&scores).ok_or_else(|| {
            AdvisorError::Inference(format!(
                "{} classifier returned no usable scores",
                artifacts.classifier().name()
            ))
        })?;
        let crop = artifacts.label_encoder().inverse_transform(class_index)?.clone();

        debug!(
            classifier = artifacts.classifier().name(),
            class_index = class_index,
            crop = %crop,
            score = scores[class_index],
            "Inference complete"
        );

        Ok(PredictionResult {
            class_index,
            crop,
            scores,
        })
    }
}
