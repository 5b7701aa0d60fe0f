//! SearchEngine: the multimodal retrieval orchestrator.
//!
//! Coordinates the embedder, vector store, similarity index and product
//! catalog under a single concurrency discipline:
//!
//! - embedding (the long-pole operation) always runs with no store lock
//!   held;
//! - the three-store mutation of one upsert or delete is a single
//!   writer-exclusive critical section, so concurrent readers observe
//!   either the complete pre-state or the complete post-state for an ID,
//!   never a torn one;
//! - searches take the shared read lock and proceed in parallel.
//!
//! Store ownership is passed explicitly into the engine at construction;
//! there are no module-level singletons.

pub mod config;
pub mod snapshot;
pub mod telemetry;

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::catalog::ProductCatalog;
use crate::data::{Metadata, MetadataValue};
use crate::embedding::embedder::{EmbedInput, Embedder};
use crate::embedding::executor::EmbedderExecutor;
use crate::error::{CalyxError, Result};
use crate::util::id::{generate_product_id, is_valid_product_id};
use crate::vector::core::vector::Vector;
use crate::vector::index::SimilarityIndex;
use crate::vector::store::VectorStore;

use self::config::EngineConfig;
use self::snapshot::{IndexSnapshot, SnapshotRecord};
use self::telemetry::{EngineObserver, NoopObserver};

/// Metadata key consulted for a caller-supplied product ID.
pub const ID_FIELD: &str = "id";

/// One ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub metadata: Metadata,
}

/// Whether an upsert created a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStatus {
    Created,
    Updated,
}

/// Outcome of a completed upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub id: String,
    pub status: UpsertStatus,
}

/// The three stores mutated together under the write lock.
#[derive(Debug)]
struct IndexState {
    vectors: VectorStore,
    index: Box<dyn SimilarityIndex>,
    catalog: ProductCatalog,
}

impl IndexState {
    fn new(config: &EngineConfig) -> Self {
        Self {
            vectors: VectorStore::new(config.dimension),
            index: config.index.build(config.dimension, config.metric),
            catalog: ProductCatalog::new(),
        }
    }
}

/// The multimodal product search engine.
#[derive(Debug)]
pub struct SearchEngine {
    config: EngineConfig,
    embedder: Arc<dyn Embedder>,
    executor: EmbedderExecutor,
    state: RwLock<IndexState>,
    observer: Arc<dyn EngineObserver>,
}

impl SearchEngine {
    /// Create an engine with empty stores.
    pub fn new(config: EngineConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        Self::with_observer(config, embedder, Arc::new(NoopObserver))
    }

    /// Create an engine with a telemetry observer attached.
    pub fn with_observer(
        config: EngineConfig,
        embedder: Arc<dyn Embedder>,
        observer: Arc<dyn EngineObserver>,
    ) -> Result<Self> {
        config.validate()?;
        let state = IndexState::new(&config);
        Ok(Self {
            config,
            embedder,
            executor: EmbedderExecutor::new()?,
            state: RwLock::new(state),
            observer,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Search by raw image bytes.
    pub fn search_by_image(&self, image: &[u8], top_k: usize) -> Result<Vec<SearchHit>> {
        self.observed("search_by_image", || {
            if image.is_empty() {
                return Err(CalyxError::embedding("empty image payload"));
            }
            let vector = self.embed_image(image)?;
            self.search_with_vector(&vector, top_k)
        })
    }

    /// Search by image with the configured default `top_k`.
    pub fn search_by_image_default(&self, image: &[u8]) -> Result<Vec<SearchHit>> {
        self.search_by_image(image, self.config.default_top_k)
    }

    /// Search by a text query.
    pub fn search_by_text(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        self.observed("search_by_text", || {
            if query.trim().is_empty() {
                return Err(CalyxError::invalid_query("query text is blank"));
            }
            let vector = self.embed_text(query)?;
            self.search_with_vector(&vector, top_k)
        })
    }

    /// Search by text with the configured default `top_k`.
    pub fn search_by_text_default(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.search_by_text(query, self.config.default_top_k)
    }

    /// Search with an already-embedded query vector.
    pub fn search_with_vector(&self, vector: &Vector, top_k: usize) -> Result<Vec<SearchHit>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        self.check_dimension(vector)?;

        let state = self.state.read();
        let index_hits = state.index.query(vector, top_k)?;

        let mut hits = Vec::with_capacity(index_hits.len());
        for hit in index_hits {
            match state.catalog.get(&hit.id) {
                Some(metadata) => hits.push(SearchHit {
                    id: hit.id,
                    score: hit.score,
                    metadata: metadata.clone(),
                }),
                None => {
                    // Torn invariant: an indexed ID without catalog metadata
                    // must never occur after a completed upsert. Contain it.
                    log::warn!(
                        "consistency warning: id '{}' present in index but missing from catalog; dropped from results",
                        hit.id
                    );
                }
            }
        }
        Ok(hits)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert a new product or replace an existing one.
    ///
    /// The ID is taken from the metadata `id` field when present (it must
    /// then be a valid non-blank string), otherwise freshly generated.
    pub fn upsert_product(&self, image: &[u8], metadata: Metadata) -> Result<UpsertOutcome> {
        self.observed("upsert_product", || {
            // Validation and embedding happen before any store is touched,
            // so a failure leaves the index unchanged.
            self.config.schema.validate(&metadata)?;
            let id = resolve_product_id(&metadata)?;

            if image.is_empty() {
                return Err(CalyxError::embedding("empty image payload"));
            }
            let vector = self.embed_image(image)?;

            // Dimension is verified above, so none of the three mutations
            // below can fail and the critical section commits as a unit.
            let mut state = self.state.write();
            let status = if state.vectors.contains(&id) {
                UpsertStatus::Updated
            } else {
                UpsertStatus::Created
            };
            state.vectors.insert(&id, vector.clone())?;
            state.index.add(&id, &vector)?;
            state.catalog.put(&id, metadata);

            Ok(UpsertOutcome { id, status })
        })
    }

    /// Remove a product from all three stores, returning whether it
    /// existed. Not exposed at the HTTP boundary; required for
    /// completeness and snapshot compaction.
    pub fn delete_product(&self, id: &str) -> Result<bool> {
        self.observed("delete_product", || {
            let mut state = self.state.write();
            let had_vector = state.vectors.remove(id);
            let had_index = state.index.remove(id);
            let had_metadata = state.catalog.remove(id);
            if had_vector != had_metadata || had_vector != had_index {
                log::warn!(
                    "consistency warning: partial presence for id '{id}' during delete \
                     (vector={had_vector}, index={had_index}, catalog={had_metadata})"
                );
            }
            Ok(had_vector || had_index || had_metadata)
        })
    }

    /// Drop every record. Explicit teardown.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.vectors.clear();
        state.index.clear();
        state.catalog.clear();
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Fetch the stored vector and metadata for a product.
    pub fn get_product(&self, id: &str) -> Option<(Vector, Metadata)> {
        let state = self.state.read();
        let vector = state.vectors.get(id)?.clone();
        let metadata = state.catalog.get(id)?.clone();
        Some((vector, metadata))
    }

    /// Number of indexed products.
    pub fn len(&self) -> usize {
        self.state.read().vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Snapshot / restore
    // =========================================================================

    /// Serialize every live record. Runs under the read lock; writers
    /// wait for the duration, which is acceptable given snapshot
    /// infrequency.
    pub fn snapshot(&self) -> IndexSnapshot {
        let state = self.state.read();
        let mut records = Vec::with_capacity(state.vectors.len());
        for (id, vector) in state.vectors.iter() {
            match state.catalog.get(id) {
                Some(metadata) => records.push(SnapshotRecord {
                    id: id.to_string(),
                    vector: vector.data.clone(),
                    metadata: metadata.clone(),
                }),
                None => {
                    log::warn!(
                        "consistency warning: id '{id}' present in vector store but missing \
                         from catalog; excluded from snapshot"
                    );
                }
            }
        }
        // Deterministic snapshot bytes for identical state.
        records.sort_by(|a, b| a.id.cmp(&b.id));
        IndexSnapshot::new(self.config.dimension, self.config.metric, records)
    }

    /// Replace all state from a snapshot, all-or-nothing.
    ///
    /// The replacement stores are fully built and validated before the
    /// write lock is taken; any failure leaves prior in-memory state
    /// untouched.
    pub fn restore(&self, snapshot: IndexSnapshot) -> Result<()> {
        self.observed("restore", || {
            snapshot.validate()?;
            if snapshot.dimension != self.config.dimension {
                return Err(CalyxError::snapshot(format!(
                    "snapshot dimension {} does not match configured dimension {}",
                    snapshot.dimension, self.config.dimension
                )));
            }

            let mut replacement = IndexState::new(&self.config);
            for record in snapshot.records {
                let vector = Vector::new(record.vector);
                replacement.vectors.insert(&record.id, vector.clone())?;
                replacement.index.add(&record.id, &vector)?;
                replacement.catalog.put(&record.id, record.metadata);
            }

            let mut state = self.state.write();
            *state = replacement;
            Ok(())
        })
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn embed_image(&self, image: &[u8]) -> Result<Vector> {
        let embedder = Arc::clone(&self.embedder);
        let owned = image.to_vec();
        let vector = self
            .executor
            .run(async move { embedder.embed(&EmbedInput::Image(&owned)).await })?;
        self.check_dimension(&vector)?;
        Ok(vector)
    }

    fn embed_text(&self, query: &str) -> Result<Vector> {
        let embedder = Arc::clone(&self.embedder);
        let owned = query.to_string();
        let vector = self
            .executor
            .run(async move { embedder.embed(&EmbedInput::Text(&owned)).await })?;
        self.check_dimension(&vector)?;
        Ok(vector)
    }

    fn check_dimension(&self, vector: &Vector) -> Result<()> {
        if vector.dimension() != self.config.dimension {
            return Err(CalyxError::dimension_mismatch(
                self.config.dimension,
                vector.dimension(),
            ));
        }
        Ok(())
    }

    fn observed<T>(&self, name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let result = f();
        self.observer
            .operation(name, start.elapsed(), result.is_ok());
        result
    }
}

/// ID resolution policy: a caller-supplied `id` metadata field wins when
/// present (and must then be a valid non-blank string); absent, a fresh
/// UUID is assigned.
fn resolve_product_id(metadata: &Metadata) -> Result<String> {
    match metadata.get(ID_FIELD) {
        None => Ok(generate_product_id()),
        Some(MetadataValue::String(id)) if is_valid_product_id(id) => Ok(id.clone()),
        Some(MetadataValue::String(id)) => Err(CalyxError::validation(format!(
            "metadata field '{ID_FIELD}' is not a usable product id: '{id}'"
        ))),
        Some(other) => Err(CalyxError::validation(format!(
            "metadata field '{ID_FIELD}' must be a string, got {:?}",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_id_generates_when_absent() {
        let id = resolve_product_id(&Metadata::new()).unwrap();
        assert!(is_valid_product_id(&id));
    }

    #[test]
    fn test_resolve_id_uses_supplied_string() {
        let mut metadata = Metadata::new();
        metadata.insert(ID_FIELD.to_string(), "sku-42".into());
        assert_eq!(resolve_product_id(&metadata).unwrap(), "sku-42");
    }

    #[test]
    fn test_resolve_id_rejects_blank_and_non_string() {
        let mut metadata = Metadata::new();
        metadata.insert(ID_FIELD.to_string(), "   ".into());
        assert!(resolve_product_id(&metadata).is_err());

        let mut metadata = Metadata::new();
        metadata.insert(ID_FIELD.to_string(), 7i64.into());
        assert!(resolve_product_id(&metadata).is_err());
    }
}
