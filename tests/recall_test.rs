//! Recall audit: the approximate HNSW backend against the brute-force
//! reference, on a random corpus.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use calyx::vector::{DistanceMetric, FlatIndex, HnswIndex, HnswParams, SimilarityIndex, Vector};

const DIMENSION: usize = 16;
const CORPUS: usize = 400;
const QUERIES: usize = 25;
const TOP_K: usize = 10;
const RECALL_FLOOR: f64 = 0.95;

fn random_vector(rng: &mut StdRng) -> Vector {
    Vector::new((0..DIMENSION).map(|_| rng.random::<f32>() - 0.5).collect())
}

#[test]
fn test_hnsw_recall_against_brute_force() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    let mut flat = FlatIndex::new(DIMENSION, DistanceMetric::Cosine);
    let mut hnsw = HnswIndex::new(DIMENSION, DistanceMetric::Cosine, HnswParams::default());

    for i in 0..CORPUS {
        let id = format!("p{i:04}");
        let vector = random_vector(&mut rng);
        flat.add(&id, &vector).unwrap();
        hnsw.add(&id, &vector).unwrap();
    }

    let mut matched = 0usize;
    let mut expected = 0usize;
    for _ in 0..QUERIES {
        let query = random_vector(&mut rng);
        let truth: HashSet<String> = flat
            .query(&query, TOP_K)
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        let approx: HashSet<String> = hnsw
            .query(&query, TOP_K)
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        matched += truth.intersection(&approx).count();
        expected += truth.len();
    }

    let recall = matched as f64 / expected as f64;
    assert!(
        recall >= RECALL_FLOOR,
        "hnsw recall {recall:.3} fell below {RECALL_FLOOR}"
    );
}

#[test]
fn test_hnsw_recall_survives_churn() {
    let mut rng = StdRng::seed_from_u64(0xc0de);

    let mut flat = FlatIndex::new(DIMENSION, DistanceMetric::Cosine);
    let mut hnsw = HnswIndex::new(DIMENSION, DistanceMetric::Cosine, HnswParams::default());

    for i in 0..CORPUS {
        let id = format!("p{i:04}");
        let vector = random_vector(&mut rng);
        flat.add(&id, &vector).unwrap();
        hnsw.add(&id, &vector).unwrap();
    }

    // Delete a third, re-add half of those with new vectors.
    for i in (0..CORPUS).step_by(3) {
        let id = format!("p{i:04}");
        assert!(flat.remove(&id));
        assert!(hnsw.remove(&id));
    }
    for i in (0..CORPUS).step_by(6) {
        let id = format!("p{i:04}");
        let vector = random_vector(&mut rng);
        flat.add(&id, &vector).unwrap();
        hnsw.add(&id, &vector).unwrap();
    }

    assert_eq!(flat.len(), hnsw.len());

    let mut matched = 0usize;
    let mut expected = 0usize;
    for _ in 0..QUERIES {
        let query = random_vector(&mut rng);
        let truth: HashSet<String> = flat
            .query(&query, TOP_K)
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        let approx: HashSet<String> = hnsw
            .query(&query, TOP_K)
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        matched += truth.intersection(&approx).count();
        expected += truth.len();
    }

    let recall = matched as f64 / expected as f64;
    assert!(
        recall >= RECALL_FLOOR,
        "post-churn hnsw recall {recall:.3} fell below {RECALL_FLOOR}"
    );
}
