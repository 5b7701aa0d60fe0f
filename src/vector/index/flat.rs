//! Exact brute-force similarity index.

use std::collections::HashMap;

use crate::error::{CalyxError, Result};
use crate::vector::core::distance::DistanceMetric;
use crate::vector::core::vector::Vector;
use crate::vector::index::{IndexHit, SimilarityIndex, rank_hits};

/// Scans every stored vector on each query. Exact by construction; the
/// recall reference for approximate backends.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    metric: DistanceMetric,
    entries: HashMap<String, Vector>,
}

impl FlatIndex {
    pub fn new(dimension: usize, metric: DistanceMetric) -> Self {
        Self {
            dimension,
            metric,
            entries: HashMap::new(),
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

impl SimilarityIndex for FlatIndex {
    fn add(&mut self, id: &str, vector: &Vector) -> Result<()> {
        if vector.dimension() != self.dimension {
            return Err(CalyxError::dimension_mismatch(
                self.dimension,
                vector.dimension(),
            ));
        }
        // HashMap insert already replaces any stale entry for this id.
        self.entries.insert(id.to_string(), vector.clone());
        Ok(())
    }

    fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    fn query(&self, vector: &Vector, top_k: usize) -> Result<Vec<IndexHit>> {
        if top_k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if vector.dimension() != self.dimension {
            return Err(CalyxError::dimension_mismatch(
                self.dimension,
                vector.dimension(),
            ));
        }

        let mut hits = Vec::with_capacity(self.entries.len());
        for (id, stored) in &self.entries {
            let score = self.metric.similarity(vector.as_slice(), stored.as_slice())?;
            hits.push(IndexHit {
                id: id.clone(),
                score,
            });
        }
        Ok(rank_hits(hits, top_k))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(entries: &[(&str, Vec<f32>)]) -> FlatIndex {
        let mut index = FlatIndex::new(2, DistanceMetric::Cosine);
        for (id, v) in entries {
            index.add(id, &Vector::new(v.clone())).unwrap();
        }
        index
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let index = FlatIndex::new(2, DistanceMetric::Cosine);
        let hits = index.query(&Vector::new(vec![1.0, 0.0]), 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_top_k_zero_returns_empty() {
        let index = index_with(&[("a", vec![1.0, 0.0])]);
        assert!(index.query(&Vector::new(vec![1.0, 0.0]), 0).unwrap().is_empty());
    }

    #[test]
    fn test_cosine_ranking_scenario() {
        // A=[1,0], B=[0,1], C=[0.9,0.1]; query [1,0] top_k=2 -> [A, C]
        let index = index_with(&[
            ("A", vec![1.0, 0.0]),
            ("B", vec![0.0, 1.0]),
            ("C", vec![0.9, 0.1]),
        ]);
        let hits = index.query(&Vector::new(vec![1.0, 0.0]), 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "A");
        assert_eq!(hits[0].score, 1.0);
        assert_eq!(hits[1].id, "C");
        assert!(hits[1].score > 0.9);
    }

    #[test]
    fn test_top_k_larger_than_len_returns_all() {
        let index = index_with(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
        let hits = index.query(&Vector::new(vec![1.0, 0.0]), 100).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_tie_broken_by_ascending_id() {
        let index = index_with(&[
            ("z", vec![1.0, 0.0]),
            ("a", vec![2.0, 0.0]), // same cosine direction, identical score
        ]);
        let hits = index.query(&Vector::new(vec![1.0, 0.0]), 2).unwrap();
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "z");
    }

    #[test]
    fn test_add_replaces_stale_entry() {
        let mut index = index_with(&[("a", vec![1.0, 0.0])]);
        index.add("a", &Vector::new(vec![0.0, 1.0])).unwrap();
        assert_eq!(index.len(), 1);
        let hits = index.query(&Vector::new(vec![0.0, 1.0]), 1).unwrap();
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = index_with(&[("a", vec![1.0, 0.0])]);
        assert!(index.query(&Vector::new(vec![1.0]), 1).is_err());
    }
}
