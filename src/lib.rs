//! Crop Advisor Library
//!
//! Recommends a crop from seven soil and weather measurements using a
//! pretrained classifier together with its fitted scaler and label encoder.

pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod types;

pub use collector::InputCollector;
pub use config::AppConfig;
pub use error::{AdvisorError, ArtifactKind};
pub use models::inference::InferenceEngine;
pub use models::store::ArtifactStore;
pub use types::{CropLabel, Feature, FeatureVector, Recommendation};
