//! Crop labels and the recommendation shown to the user

use crate::types::features::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Crop name as stored in the label encoder (e.g. `rice`, `kidneybeans`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropLabel(String);

impl CropLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name with the first letter upper-cased and the rest lower-cased.
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for CropLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CropLabel {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A crop together with the classifier's score for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScore {
    pub crop: CropLabel,
    pub class_index: usize,
    pub score: f32,
}

/// Result of one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Unique recommendation identifier
    pub recommendation_id: String,

    /// Recommended crop
    pub crop: CropLabel,

    /// Index of the crop in the label encoder
    pub class_index: usize,

    /// Classifier score for the recommended crop
    pub confidence: f32,

    /// Next best crops, highest score first
    pub alternatives: Vec<ClassScore>,

    /// Measurements the recommendation was made for
    pub features: FeatureVector,

    /// Generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl Recommendation {
    pub fn new(crop: CropLabel, class_index: usize, confidence: f32, features: FeatureVector) -> Self {
        Self {
            recommendation_id: uuid::Uuid::new_v4().to_string(),
            crop,
            class_index,
            confidence,
            alternatives: Vec::new(),
            features,
            timestamp: Utc::now(),
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<ClassScore>) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Plain-text rendering for the terminal form.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "Recommended crop: {} ({:.1}%)",
            self.crop.display_name(),
            self.confidence * 100.0
        );
        if !self.alternatives.is_empty() {
            let others: Vec<String> = self
                .alternatives
                .iter()
                .map(|alt| format!("{} ({:.1}%)", alt.crop.display_name(), alt.score * 100.0))
                .collect();
            out.push_str("\nAlso suitable: ");
            out.push_str(&others.join(", "));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(CropLabel::from("rice").display_name(), "Rice");
        assert_eq!(CropLabel::from("kidneyBeans").display_name(), "Kidneybeans");
        assert_eq!(CropLabel::from("").display_name(), "");
        assert_eq!(CropLabel::from("rice").to_string(), "rice");
    }

    #[test]
    fn test_render_text() {
        let rec = Recommendation::new(CropLabel::from("maize"), 1, 0.8712, FeatureVector::default())
            .with_alternatives(vec![ClassScore {
                crop: CropLabel::from("rice"),
                class_index: 2,
                score: 0.1,
            }]);

        assert_eq!(
            rec.render_text(),
            "Recommended crop: Maize (87.1%)\nAlso suitable: Rice (10.0%)"
        );
    }

    #[test]
    fn test_recommendation_serialization() {
        let rec = Recommendation::new(CropLabel::from("mango"), 4, 0.5, FeatureVector::default());

        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"crop\":\"mango\""));

        let deserialized: Recommendation = serde_json::from_str(&json).unwrap();
        assert_eq!(rec.recommendation_id, deserialized.recommendation_id);
        assert_eq!(rec.crop, deserialized.crop);
        assert_eq!(rec.features, deserialized.features);
    }
}
