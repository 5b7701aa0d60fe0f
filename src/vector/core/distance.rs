//! Distance metrics for vector similarity scoring.

use serde::{Deserialize, Serialize};

use crate::error::{CalyxError, Result};

/// Supported distance metrics.
///
/// Cosine is the default and the ranking score fixed by the engine; the
/// other metrics are available for index-level experimentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    DotProduct,
    Euclidean,
}

impl DistanceMetric {
    /// Similarity score between two vectors: higher is more similar.
    ///
    /// For `Euclidean` the distance is mapped into `1 / (1 + d)` so all
    /// metrics rank descending.
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(CalyxError::dimension_mismatch(a.len(), b.len()));
        }
        match self {
            DistanceMetric::Cosine => Ok(cosine_similarity(a, b)),
            DistanceMetric::DotProduct => Ok(dot(a, b)),
            DistanceMetric::Euclidean => {
                let d = euclidean_distance(a, b);
                Ok(1.0 / (1.0 + d))
            }
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity. A zero-magnitude operand scores 0.0 rather than NaN.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = dot(a, b);
    let mag_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let mag_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    // Clamp against float drift so a self-match reports exactly 1.0.
    (dot / (mag_a * mag_b)).clamp(-1.0, 1.0)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
