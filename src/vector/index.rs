//! SimilarityIndex: pluggable top-K retrieval over stored vectors.
//!
//! Two conforming backends are provided:
//!
//! - [`flat::FlatIndex`] - exact brute-force scan, the correctness
//!   reference.
//! - [`hnsw::HnswIndex`] - approximate graph index for scale, audited
//!   against the flat index for recall.
//!
//! Both satisfy the same query contract: results sorted by descending
//! similarity, ties broken by ascending ID, `top_k == 0` and empty
//! indexes yield empty results rather than errors.

pub mod flat;
pub mod hnsw;

use std::cmp::Ordering as CmpOrdering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vector::core::distance::DistanceMetric;
use crate::vector::core::vector::Vector;

/// A single scored index match.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub id: String,
    pub score: f32,
}

/// Algorithmic structure answering top-K similarity queries.
///
/// `add` on an existing ID replaces the stale entry; duplicate entries
/// per ID never coexist.
pub trait SimilarityIndex: Send + Sync + fmt::Debug {
    /// Add or replace the vector for `id`.
    fn add(&mut self, id: &str, vector: &Vector) -> Result<()>;

    /// Remove `id`, returning whether it was indexed.
    fn remove(&mut self, id: &str) -> bool;

    /// Return up to `top_k` hits ranked by descending similarity.
    fn query(&self, vector: &Vector, top_k: usize) -> Result<Vec<IndexHit>>;

    /// Number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    fn clear(&mut self);
}

/// Which index backend to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexKind {
    /// Exact brute-force scan.
    Flat,
    /// Approximate HNSW graph.
    Hnsw {
        #[serde(default = "default_m")]
        m: usize,
        #[serde(default = "default_ef_construction")]
        ef_construction: usize,
        #[serde(default = "default_ef_search")]
        ef_search: usize,
    },
}

fn default_m() -> usize {
    16
}

fn default_ef_construction() -> usize {
    200
}

fn default_ef_search() -> usize {
    100
}

impl Default for IndexKind {
    fn default() -> Self {
        IndexKind::Flat
    }
}

impl IndexKind {
    pub fn hnsw_defaults() -> Self {
        IndexKind::Hnsw {
            m: default_m(),
            ef_construction: default_ef_construction(),
            ef_search: default_ef_search(),
        }
    }

    /// Build an index of this kind for the given dimension and metric.
    pub fn build(&self, dimension: usize, metric: DistanceMetric) -> Box<dyn SimilarityIndex> {
        match self {
            IndexKind::Flat => Box::new(flat::FlatIndex::new(dimension, metric)),
            IndexKind::Hnsw {
                m,
                ef_construction,
                ef_search,
            } => Box::new(hnsw::HnswIndex::new(
                dimension,
                metric,
                hnsw::HnswParams {
                    m: *m,
                    ef_construction: *ef_construction,
                    ef_search: *ef_search,
                },
            )),
        }
    }
}

/// Rank hits by descending score, ties broken by ascending ID, and
/// truncate to `top_k`. Shared by both backends so the ordering contract
/// is identical.
pub(crate) fn rank_hits(mut hits: Vec<IndexHit>, top_k: usize) -> Vec<IndexHit> {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(CmpOrdering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    hits.truncate(top_k);
    hits
}
