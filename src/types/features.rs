//! Soil and weather measurements fed to the crop classifier

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of measurements the classifier is trained on.
pub const FEATURE_COUNT: usize = 7;

/// One of the seven measurements, in classifier input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
}

impl Feature {
    /// Classifier input order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Ph,
        Feature::Rainfall,
    ];

    /// Order the form asks in: nutrients first, then weather.
    pub const FORM_ORDER: [Feature; FEATURE_COUNT] = [
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::Ph,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Rainfall,
    ];

    /// Position in the classifier input.
    pub fn index(self) -> usize {
        match self {
            Feature::Nitrogen => 0,
            Feature::Phosphorus => 1,
            Feature::Potassium => 2,
            Feature::Temperature => 3,
            Feature::Humidity => 4,
            Feature::Ph => 5,
            Feature::Rainfall => 6,
        }
    }

    /// Column name used when the scaler was fitted.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Nitrogen => "N",
            Feature::Phosphorus => "P",
            Feature::Potassium => "K",
            Feature::Temperature => "temperature",
            Feature::Humidity => "humidity",
            Feature::Ph => "ph",
            Feature::Rainfall => "rainfall",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feature::Nitrogen => "Nitrogen (N)",
            Feature::Phosphorus => "Phosphorus (P)",
            Feature::Potassium => "Potassium (K)",
            Feature::Temperature => "Temperature",
            Feature::Humidity => "Humidity",
            Feature::Ph => "Soil pH",
            Feature::Rainfall => "Rainfall",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Feature::Nitrogen | Feature::Phosphorus | Feature::Potassium => "ppm",
            Feature::Temperature => "°C",
            Feature::Humidity => "%",
            Feature::Ph => "",
            Feature::Rainfall => "mm",
        }
    }

    /// Inclusive sensor range accepted by the form.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Feature::Nitrogen => (0.0, 140.0),
            Feature::Phosphorus => (5.0, 145.0),
            Feature::Potassium => (5.0, 205.0),
            Feature::Temperature => (0.0, 50.0),
            Feature::Humidity => (10.0, 100.0),
            Feature::Ph => (3.0, 10.0),
            Feature::Rainfall => (0.0, 300.0),
        }
    }

    /// Value the form starts with.
    pub fn default_value(self) -> f64 {
        match self {
            Feature::Nitrogen | Feature::Phosphorus | Feature::Potassium => 50.0,
            Feature::Temperature => 25.0,
            Feature::Humidity => 60.0,
            Feature::Ph => 6.5,
            Feature::Rainfall => 100.0,
        }
    }

    pub fn contains(self, value: f64) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }

    pub fn clamp(self, value: f64) -> f64 {
        let (min, max) = self.bounds();
        value.clamp(min, max)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The seven measurements of one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl FeatureVector {
    pub fn new(
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        temperature: f64,
        humidity: f64,
        ph: f64,
        rainfall: f64,
    ) -> Self {
        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    /// Build from a slice in classifier order. Never truncates or pads.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let values: [f64; FEATURE_COUNT] =
            values.try_into().map_err(|_| AdvisorError::ShapeMismatch {
                stage: "feature vector",
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self::from(values))
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Nitrogen => self.nitrogen,
            Feature::Phosphorus => self.phosphorus,
            Feature::Potassium => self.potassium,
            Feature::Temperature => self.temperature,
            Feature::Humidity => self.humidity,
            Feature::Ph => self.ph,
            Feature::Rainfall => self.rainfall,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        let slot = match feature {
            Feature::Nitrogen => &mut self.nitrogen,
            Feature::Phosphorus => &mut self.phosphorus,
            Feature::Potassium => &mut self.potassium,
            Feature::Temperature => &mut self.temperature,
            Feature::Humidity => &mut self.humidity,
            Feature::Ph => &mut self.ph,
            Feature::Rainfall => &mut self.rainfall,
        };
        *slot = value;
    }

    /// Values in classifier order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        Feature::ALL.map(|feature| self.get(feature))
    }

    /// Features whose value lies outside the documented sensor range.
    pub fn out_of_range(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|&feature| !feature.contains(self.get(feature)))
            .collect()
    }

    /// Smallest value accepted for every feature.
    pub fn minimum() -> Self {
        Self::from(Feature::ALL.map(|feature| feature.bounds().0))
    }

    /// Largest value accepted for every feature.
    pub fn maximum() -> Self {
        Self::from(Feature::ALL.map(|feature| feature.bounds().1))
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(v: [f64; FEATURE_COUNT]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5], v[6])
    }
}

impl Default for FeatureVector {
    /// The form's starting values.
    fn default() -> Self {
        Self::from(Feature::ALL.map(Feature::default_value))
    }
}
