//! VectorStore: low-level keyed vector storage.
//!
//! Owns the mapping of product ID to embedding vector and enforces the
//! configured dimension on every insert. Metadata lives in the
//! [`ProductCatalog`](crate::catalog::ProductCatalog); ranking lives in the
//! [`SimilarityIndex`](crate::vector::index::SimilarityIndex). The engine
//! keeps all three consistent under its write lock.

use std::collections::HashMap;

use crate::error::{CalyxError, Result};
use crate::vector::core::vector::Vector;

/// In-memory vector storage keyed by product ID.
#[derive(Debug, Clone)]
pub struct VectorStore {
    dimension: usize,
    vectors: HashMap<String, Vector>,
}

impl VectorStore {
    /// Create an empty store for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Add or replace the vector for `id`.
    pub fn insert(&mut self, id: impl Into<String>, vector: Vector) -> Result<()> {
        if vector.dimension() != self.dimension {
            return Err(CalyxError::dimension_mismatch(
                self.dimension,
                vector.dimension(),
            ));
        }
        if !vector.is_valid() {
            return Err(CalyxError::validation(
                "vector contains non-finite components",
            ));
        }
        self.vectors.insert(id.into(), vector);
        Ok(())
    }

    /// Remove the vector for `id`, returning whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.vectors.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Vector> {
        self.vectors.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vectors.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.vectors.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vector)> {
        self.vectors.iter().map(|(id, v)| (id.as_str(), v))
    }

    pub fn clear(&mut self) {
        self.vectors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_get_returns_exact_vector() {
        let mut store = VectorStore::new(3);
        let v = Vector::new(vec![0.1, 0.2, 0.3]);
        store.insert("p1", v.clone()).unwrap();
        assert_eq!(store.get("p1"), Some(&v));
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut store = VectorStore::new(2);
        store.insert("p1", Vector::new(vec![1.0, 0.0])).unwrap();
        store.insert("p1", Vector::new(vec![0.0, 1.0])).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("p1").unwrap().data, vec![0.0, 1.0]);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut store = VectorStore::new(4);
        let err = store.insert("p1", Vector::new(vec![1.0, 2.0])).unwrap_err();
        assert!(matches!(
            err,
            CalyxError::DimensionMismatch {
                expected: 4,
                actual: 2
            }
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_non_finite_vector_rejected() {
        let mut store = VectorStore::new(2);
        assert!(
            store
                .insert("p1", Vector::new(vec![f32::INFINITY, 0.0]))
                .is_err()
        );
    }

    #[test]
    fn test_remove_reports_existence() {
        let mut store = VectorStore::new(2);
        store.insert("p1", Vector::new(vec![1.0, 0.0])).unwrap();
        assert!(store.remove("p1"));
        assert!(!store.remove("p1"));
        assert!(store.get("p1").is_none());
    }
}
