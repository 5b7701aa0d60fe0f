//! # Calyx
//!
//! A multimodal vector index and retrieval engine for product search.
//!
//! ## Features
//!
//! - Image and text queries in a shared embedding space
//! - Pluggable exact (flat) and approximate (HNSW) similarity indexes
//! - Cosine-similarity ranking with deterministic tie-breaking
//! - Atomic upserts across vector, index and metadata stores
//! - Snapshot/restore with all-or-nothing semantics

// Core modules
pub mod catalog;
mod data;
pub mod embedding;
mod engine;
mod error;
mod util;
pub mod vector;

// Re-exports for the public API
pub use catalog::ProductCatalog;
pub use data::{Metadata, MetadataKind, MetadataSchema, MetadataValue};
pub use embedding::embedder::{EmbedInput, Embedder};
pub use embedding::executor::EmbedderExecutor;
pub use embedding::hashing::HashingEmbedder;
pub use engine::config::{EngineConfig, EngineConfigBuilder};
pub use engine::snapshot::{IndexSnapshot, SnapshotRecord};
pub use engine::telemetry::{EngineObserver, LogObserver, NoopObserver};
pub use engine::{ID_FIELD, SearchEngine, SearchHit, UpsertOutcome, UpsertStatus};
pub use error::{CalyxError, Result};
pub use vector::core::distance::DistanceMetric;
pub use vector::core::vector::Vector;
pub use vector::index::{IndexHit, IndexKind, SimilarityIndex};
pub use vector::store::VectorStore;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
