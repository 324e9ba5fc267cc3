//! Classifier abstraction shared by the ONNX and dense-network backends

use crate::error::{AdvisorError, Result};

/// A trained model mapping one scaled feature row to per-class scores.
pub trait Classifier: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Input width declared by the model, if it declares one.
    fn input_width(&self) -> Option<usize>;

    /// Number of classes the model scores, if it declares one.
    fn output_width(&self) -> Option<usize>;

    /// Per-class scores for one scaled row.
    fn predict(&self, scaled: &[f32]) -> Result<Vec<f32>>;
}

/// Index of the highest score. Ties go to the lowest index; NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Indices ordered by descending score, ties by ascending index. NaN scores are dropped.
pub fn ranked(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).filter(|&i| !scores[i].is_nan()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order
}

pub(crate) fn check_input(scaled: &[f32], expected: Option<usize>, stage: &'static str) -> Result<()> {
    match expected {
        Some(expected) if expected != scaled.len() => Err(AdvisorError::ShapeMismatch {
            stage,
            expected,
            actual: scaled.len(),
        }),
        _ => Ok(()),
    }
}
