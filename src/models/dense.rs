//! Dense feed-forward network exported as JSON
//!
//! The crop model is a small stack of fully connected layers. Exporting the
//! weights as JSON lets the advisor run without ONNX Runtime. Each layer stores
//! one weight row per output unit.

use crate::error::{AdvisorError, ArtifactKind, Result};
use crate::models::classifier::{check_input, Classifier};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    fn apply(self, values: &mut [f32]) {
        match self {
            Activation::Linear => {}
            Activation::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
            Activation::Sigmoid => values.iter_mut().for_each(|v| *v = 1.0 / (1.0 + (-*v).exp())),
            Activation::Tanh => values.iter_mut().for_each(|v| *v = v.tanh()),
            Activation::Softmax => {
                let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let mut sum = 0.0;
                for v in values.iter_mut() {
                    *v = (*v - max).exp();
                    sum += *v;
                }
                if sum > 0.0 {
                    values.iter_mut().for_each(|v| *v /= sum);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DenseLayer {
    /// `weights[j][i]` connects input `i` to output unit `j`
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    fn units(&self) -> usize {
        self.biases.len()
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut out: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + bias)
            .collect();
        self.activation.apply(&mut out);
        out
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DenseNetwork {
    pub input_width: usize,
    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Check that layers chain from `input_width` to the output.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".to_string());
        }

        let mut width = self.input_width;
        for (n, layer) in self.layers.iter().enumerate() {
            if layer.weights.len() != layer.units() {
                return Err(format!(
                    "layer {} has {} weight rows but {} biases",
                    n,
                    layer.weights.len(),
                    layer.units()
                ));
            }
            if let Some(row) = layer.weights.iter().position(|row| row.len() != width) {
                return Err(format!(
                    "layer {} row {} has {} weights, expected {}",
                    n,
                    row,
                    layer.weights[row].len(),
                    width
                ));
            }
            let finite = layer
                .weights
                .iter()
                .flatten()
                .chain(&layer.biases)
                .all(|v| v.is_finite());
            if !finite {
                return Err(format!("layer {} contains non-finite parameters", n));
            }
            width = layer.units();
        }
        Ok(())
    }

    /// Load a network from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AdvisorError::load(ArtifactKind::Model, path, e))?;
        let network: DenseNetwork = serde_json::from_str(&contents)
            .map_err(|e| AdvisorError::load(ArtifactKind::Model, path, e))?;
        network
            .validate()
            .map_err(|e| AdvisorError::load(ArtifactKind::Model, path, e))?;

        info!(
            model = "dense",
            path = %path.display(),
            layers = network.layers.len(),
            inputs = network.input_width,
            classes = network.output_units(),
            "Model loaded successfully"
        );
        Ok(network)
    }

    fn output_units(&self) -> usize {
        self.layers.last().map(DenseLayer::units).unwrap_or(0)
    }
}

impl Classifier for DenseNetwork {
    fn name(&self) -> &str {
        "dense"
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.input_width)
    }

    fn output_width(&self) -> Option<usize> {
        Some(self.output_units())
    }

    fn predict(&self, scaled: &[f32]) -> Result<Vec<f32>> {
        check_input(scaled, self.input_width(), "dense model")?;
        let scores = self
            .layers
            .iter()
            .fold(scaled.to_vec(), |input, layer| layer.forward(&input));
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(weights: Vec<Vec<f32>>, biases: Vec<f32>, activation: Activation) -> DenseLayer {
        DenseLayer {
            weights,
            biases,
            activation,
        }
    }

    #[test]
    fn test_forward_linear() {
        let network = DenseNetwork {
            input_width: 2,
            layers: vec![layer(
                vec![vec![1.0, 2.0], vec![-1.0, 0.5]],
                vec![0.5, 0.0],
                Activation::Linear,
            )],
        };
        assert!(network.validate().is_ok());
        assert_eq!(network.predict(&[1.0, 2.0]).unwrap(), vec![5.5, 0.0]);
    }

    #[test]
    fn test_relu_then_softmax() {
        let network = DenseNetwork {
            input_width: 1,
            layers: vec![
                layer(vec![vec![1.0], vec![-1.0]], vec![0.0, 0.0], Activation::Relu),
                layer(
                    vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                    vec![0.0, 0.0],
                    Activation::Softmax,
                ),
            ],
        };
        let probs = network.predict(&[2.0]).unwrap();
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_validate_rejects_broken_chain() {
        let network = DenseNetwork {
            input_width: 3,
            layers: vec![layer(vec![vec![1.0, 1.0]], vec![0.0], Activation::Linear)],
        };
        assert!(network.validate().unwrap_err().contains("expected 3"));

        let network = DenseNetwork {
            input_width: 1,
            layers: vec![layer(vec![vec![1.0]], vec![0.0, 1.0], Activation::Linear)],
        };
        assert!(network.validate().is_err());

        let empty = DenseNetwork {
            input_width: 7,
            layers: vec![],
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_predict_checks_width() {
        let network = DenseNetwork {
            input_width: 2,
            layers: vec![layer(vec![vec![1.0, 1.0]], vec![0.0], Activation::Sigmoid)],
        };
        assert!(matches!(
            network.predict(&[1.0]).unwrap_err(),
            AdvisorError::ShapeMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_deserialize_activation_names() {
        let json = r#"{
            "input_width": 1,
            "layers": [{"weights": [[1.0]], "biases": [0.0], "activation": "tanh"}]
        }"#;
        let network: DenseNetwork = serde_json::from_str(json).unwrap();
        assert_eq!(network.layers[0].activation, Activation::Tanh);
        assert_eq!(network.output_width(), Some(1));
    }
}
