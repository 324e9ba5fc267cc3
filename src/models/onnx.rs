//! ONNX Runtime backend for the crop classifier

use crate::error::{AdvisorError, ArtifactKind, Result};
use crate::models::classifier::{check_input, Classifier};
use anyhow::Context;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Classifier backed by an ONNX Runtime session
pub struct OnnxClassifier {
    /// Running a session needs `&mut`, so calls are serialized.
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_width: Option<usize>,
    output_width: Option<usize>,
}

impl OnnxClassifier {
    /// Load an ONNX model from file.
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();
        Self::load_session(path, onnx_threads)
            .map_err(|e| AdvisorError::load(ArtifactKind::Model, path, format!("{:#}", e)))
    }

    fn load_session(path: &Path, onnx_threads: usize) -> anyhow::Result<Self> {
        info!(path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        if !path.is_file() {
            anyhow::bail!("file not found");
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context("ONNX Runtime rejected the model")?;

        let input = session
            .inputs
            .first()
            .context("model declares no inputs")?;
        let input_name = input.name.clone();
        let input_width = last_dimension(&input.input_type);

        let outputs: Vec<OutputInfo> = session
            .outputs
            .iter()
            .map(|o| OutputInfo {
                name: o.name.clone(),
                float_tensor: is_float_tensor(&o.output_type),
                width: last_dimension(&o.output_type),
            })
            .collect();
        let output = select_output(&outputs).with_context(|| {
            let names: Vec<&str> = outputs.iter().map(|o| o.name.as_str()).collect();
            format!("no float tensor output among {:?}", names)
        })?;
        let output_name = output.name.clone();
        let output_width = output.width;

        info!(
            input = %input_name,
            output = %output_name,
            input_width = ?input_width,
            classes = ?output_width,
            "Model loaded successfully"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_width,
            output_width,
        })
    }

    fn run(&self, scaled: &[f32]) -> anyhow::Result<Vec<f32>> {
        // Shape [1, num_features]
        let shape = vec![1_i64, scaled.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, scaled.to_vec())).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        let output = outputs
            .get(self.output_name.as_str())
            .with_context(|| format!("output `{}` missing", self.output_name))?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .context("output is not a float tensor")?;

        debug!(shape = ?shape, "Extracted scores from tensor");
        Ok(data.to_vec())
    }
}

/// What output selection needs to know about a graph output
#[derive(Debug, Clone, PartialEq)]
struct OutputInfo {
    name: String,
    float_tensor: bool,
    width: Option<usize>,
}

/// Pick the class-score output.
///
/// Keras exports a single probability tensor. Converted classical models put an
/// int64 `label` output first and the probabilities after it, sometimes as a
/// `seq(map)` that cannot be read as a tensor. Only float tensors qualify;
/// among them a `prob` name wins, then any name without `label`.
fn select_output(outputs: &[OutputInfo]) -> Option<&OutputInfo> {
    let candidates = || outputs.iter().filter(|o| o.float_tensor);
    candidates()
        .find(|o| o.name.contains("prob"))
        .or_else(|| candidates().find(|o| !o.name.contains("label")))
        .or_else(|| candidates().next())
}

fn is_float_tensor(value_type: &ValueType) -> bool {
    matches!(
        value_type,
        ValueType::Tensor {
            ty: TensorElementType::Float32,
            ..
        }
    )
}

/// Fixed size of the last axis, if the model declares one.
fn last_dimension(value_type: &ValueType) -> Option<usize> {
    match value_type {
        ValueType::Tensor { shape, .. } => shape
            .last()
            .copied()
            .filter(|&d| d > 0)
            .map(|d| d as usize),
        _ => None,
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn input_width(&self) -> Option<usize> {
        self.input_width
    }

    fn output_width(&self) -> Option<usize> {
        self.output_width
    }

    fn predict(&self, scaled: &[f32]) -> Result<Vec<f32>> {
        check_input(scaled, self.input_width, "onnx model")?;
        self.run(scaled)
            .map_err(|e| AdvisorError::Inference(format!("{:#}", e)))
    }
}
