//! End-to-end inference against the reference artifacts in `tests/fixtures`.

use crop_advisor::models::FileArtifactSource;
use crop_advisor::{AdvisorError, AppConfig, ArtifactKind, ArtifactStore, Feature, FeatureVector, InferenceEngine};
use rand::Rng;
use std::path::{Path, PathBuf};

const CROPS: [&str; 3] = ["chickpea", "maize", "rice"];

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn reference_source() -> FileArtifactSource {
    FileArtifactSource::new(
        fixture("crop_model.json"),
        fixture("scaler.json"),
        fixture("label_encoder.json"),
    )
}

fn reference_engine() -> InferenceEngine {
    InferenceEngine::new(ArtifactStore::new(reference_source()))
}

#[test]
fn test_form_defaults_recommend_maize() {
    let engine = reference_engine();
    let crop = engine
        .predict(&[50.0, 50.0, 50.0, 25.0, 60.0, 6.5, 100.0])
        .unwrap();
    assert_eq!(crop.as_str(), "maize");
    assert_eq!(crop.display_name(), "Maize");
}

#[test]
fn test_boundary_inputs_produce_labels() {
    let engine = reference_engine();

    let low = engine.predict(&[0.0, 5.0, 5.0, 0.0, 10.0, 3.0, 0.0]).unwrap();
    assert_eq!(low.as_str(), "chickpea");

    let high = engine
        .predict(&[140.0, 145.0, 205.0, 50.0, 100.0, 10.0, 300.0])
        .unwrap();
    assert_eq!(high.as_str(), "rice");
}

#[test]
fn test_deterministic() {
    let engine = reference_engine();
    let features = FeatureVector::new(90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9);

    let first = engine.recommend(&features).unwrap();
    let second = engine.recommend(&features).unwrap();
    assert_eq!(first.crop, second.crop);
    assert_eq!(first.confidence, second.confidence);
    assert_ne!(first.recommendation_id, second.recommendation_id);
}

#[test]
fn test_random_in_range_inputs_produce_known_crops() {
    let engine = reference_engine();
    let mut rng = rand::thread_rng();

    for _ in 0..200 {
        let mut features = FeatureVector::default();
        for feature in Feature::ALL {
            let (min, max) = feature.bounds();
            features.set(feature, rng.gen_range(min..=max));
        }
        let crop = engine.predict(&features.to_array()).unwrap();
        assert!(CROPS.contains(&crop.as_str()), "unexpected crop {}", crop);
    }
}

#[test]
fn test_wrong_width_is_rejected() {
    let engine = reference_engine();
    let err = engine.predict(&[50.0, 50.0, 50.0, 25.0, 60.0, 6.5]).unwrap_err();
    assert!(matches!(err, AdvisorError::ShapeMismatch { expected: 7, actual: 6, .. }));
}

#[test]
fn test_recommendation_details() {
    let engine = reference_engine().with_alternatives(2);
    let rec = engine.recommend(&FeatureVector::default()).unwrap();

    assert_eq!(rec.crop.as_str(), "maize");
    assert_eq!(rec.class_index, 1);
    // softmax([0.0, 0.5, 0.2])[1]
    assert!((rec.confidence - 0.426).abs() < 0.001);
    let alternatives: Vec<&str> = rec.alternatives.iter().map(|a| a.crop.as_str()).collect();
    assert_eq!(alternatives, vec!["rice", "chickpea"]);
}

#[test]
fn test_artifacts_load_lazily_and_once() {
    let engine = reference_engine();
    assert!(!engine.is_ready());

    let first = engine.warm_up().unwrap() as *const _;
    engine.predict(&FeatureVector::default().to_array()).unwrap();
    let second = engine.warm_up().unwrap() as *const _;

    assert!(engine.is_ready());
    assert_eq!(first, second);
}

#[test]
fn test_missing_artifact_fails_every_request() {
    let engine = InferenceEngine::new(ArtifactStore::new(FileArtifactSource::new(
        fixture("crop_model.json"),
        fixture("missing_scaler.json"),
        fixture("label_encoder.json"),
    )));

    for _ in 0..2 {
        let err = engine.predict(&FeatureVector::default().to_array()).unwrap_err();
        assert!(matches!(
            err,
            AdvisorError::ArtifactLoad { artifact: ArtifactKind::Scaler, .. }
        ));
    }
    assert!(!engine.is_ready());
}

#[test]
fn test_label_encoder_from_another_training_run() {
    let dir = std::env::temp_dir().join(format!("crop-advisor-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let encoder = dir.join("label_encoder.json");
    std::fs::write(&encoder, r#"{"classes_": ["chickpea", "maize", "mango", "rice"]}"#).unwrap();

    let engine = InferenceEngine::new(ArtifactStore::new(FileArtifactSource::new(
        fixture("crop_model.json"),
        fixture("scaler.json"),
        &encoder,
    )));
    let err = engine.warm_up().unwrap_err();
    std::fs::remove_dir_all(&dir).unwrap();

    assert!(matches!(
        err,
        AdvisorError::IncompatibleArtifacts { artifact: ArtifactKind::LabelEncoder, .. }
    ));
}

#[test]
fn test_shipped_config_runs_out_of_the_box() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut config = AppConfig::load_from_path(root.join("config").join("config.toml")).unwrap();
    config.artifacts.dir = root.join(&config.artifacts.dir).to_string_lossy().into_owned();

    let engine = InferenceEngine::new(ArtifactStore::from_config(&config.artifacts));
    engine.warm_up().unwrap();
    let crop = engine.predict(&FeatureVector::default().to_array()).unwrap();
    assert_eq!(crop.as_str(), "maize");
}
