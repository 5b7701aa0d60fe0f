//! Vector storage and similarity retrieval.
//!
//! # Module Structure
//!
//! - [`core`] - Core data structures (vector, distance)
//! - [`index`] - Similarity index backends (flat, hnsw)
//! - [`store`] - Keyed vector storage

pub mod core;
pub mod index;
pub mod store;

pub use self::core::distance::DistanceMetric;
pub use self::core::vector::Vector;
pub use index::flat::FlatIndex;
pub use index::hnsw::{HnswIndex, HnswParams};
pub use index::{IndexHit, IndexKind, SimilarityIndex};
pub use store::VectorStore;
