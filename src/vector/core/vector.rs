//! Core vector type.

use serde::{Deserialize, Serialize};

/// A fixed-dimension embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub data: Vec<f32>,
}

impl Vector {
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// True when every component is finite.
    pub fn is_valid(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Euclidean magnitude.
    pub fn magnitude(&self) -> f32 {
        self.data.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Returns an L2-normalized copy. A zero vector is returned unchanged.
    pub fn normalized(&self) -> Vector {
        let mag = self.magnitude();
        if mag == 0.0 {
            return self.clone();
        }
        Vector::new(self.data.iter().map(|v| v / mag).collect())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Vector::new(data)
    }
}

impl AsRef<[f32]> for Vector {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_and_validity() {
        let v = Vector::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(v.dimension(), 3);
        assert!(v.is_valid());

        let bad = Vector::new(vec![1.0, f32::NAN]);
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_normalized_unit_magnitude() {
        let v = Vector::new(vec![3.0, 4.0]);
        let n = v.normalized();
        assert!((n.magnitude() - 1.0).abs() < 1e-6);
        assert!((n.data[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_zero_vector_unchanged() {
        let v = Vector::new(vec![0.0, 0.0]);
        assert_eq!(v.normalized(), v);
    }
}
