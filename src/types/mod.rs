//! Type definitions for the crop advisor

pub mod features;
pub mod recommendation;

pub use features::{Feature, FeatureVector, FEATURE_COUNT};
pub use recommendation::{ClassScore, CropLabel, Recommendation};
