//! ML model inference components

pub mod classifier;
pub mod dense;
pub mod inference;
pub mod label_encoder;
pub mod loader;
pub mod onnx;
pub mod scaler;
pub mod store;

pub use classifier::Classifier;
pub use inference::InferenceEngine;
pub use label_encoder::LabelEncoder;
pub use loader::{ArtifactSource, Artifacts, FileArtifactSource};
pub use scaler::Scaler;
pub use store::ArtifactStore;
