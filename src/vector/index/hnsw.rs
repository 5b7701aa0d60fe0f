//! Approximate similarity index based on HNSW graphs.
//!
//! Hierarchical Navigable Small World: nodes are linked on a stack of
//! layers, sparse at the top and dense at layer 0. Queries descend
//! greedily through the upper layers, then run a beam search (`ef`) on
//! layer 0. Removal tombstones the slot; tombstoned nodes still route
//! traversal but never appear in results. Compaction happens when the
//! engine rebuilds the index from a snapshot.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};

use rand::Rng;

use crate::error::{CalyxError, Result};
use crate::vector::core::distance::DistanceMetric;
use crate::vector::core::vector::Vector;
use crate::vector::index::{IndexHit, SimilarityIndex, rank_hits};

/// HNSW construction and search parameters.
#[derive(Debug, Clone, Copy)]
pub struct HnswParams {
    /// Bi-directional links per node per layer.
    pub m: usize,
    /// Beam width while building.
    pub ef_construction: usize,
    /// Beam width while searching.
    pub ef_search: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 100,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    id: String,
    vector: Vector,
    /// Neighbor slots per layer, index 0 is the base layer.
    neighbors: Vec<Vec<usize>>,
    deleted: bool,
}

impl Node {
    fn top_layer(&self) -> usize {
        self.neighbors.len() - 1
    }
}

/// Candidate ordered by ascending distance (min-heap via `Reverse`-style
/// comparator inversion).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    dist: f32,
    slot: usize,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Reversed so BinaryHeap pops the closest candidate first.
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(CmpOrdering::Equal)
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

/// Approximate HNSW similarity index.
#[derive(Debug)]
pub struct HnswIndex {
    dimension: usize,
    metric: DistanceMetric,
    params: HnswParams,
    nodes: Vec<Node>,
    slots: HashMap<String, usize>,
    entry_point: Option<usize>,
    max_layer: usize,
    live_count: usize,
    level_mult: f64,
}

impl HnswIndex {
    pub fn new(dimension: usize, metric: DistanceMetric, params: HnswParams) -> Self {
        let m = params.m.max(2) as f64;
        Self {
            dimension,
            metric,
            params,
            nodes: Vec::new(),
            slots: HashMap::new(),
            entry_point: None,
            max_layer: 0,
            live_count: 0,
            level_mult: 1.0 / m.ln(),
        }
    }

    pub fn params(&self) -> HnswParams {
        self.params
    }

    /// Internal distance: negated similarity so smaller is closer for
    /// every metric.
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        // Dimensions are validated at the add/query boundary.
        -self.metric.similarity(a, b).unwrap_or(f32::NEG_INFINITY)
    }

    fn random_layer(&self) -> usize {
        let mut rng = rand::rng();
        let uniform: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
        let layer = (-uniform.ln() * self.level_mult) as usize;
        layer.min(16)
    }

    /// Greedy descent on one layer: move to the closest neighbor until no
    /// neighbor improves.
    fn greedy_closest(&self, mut current: usize, query: &[f32], layer: usize) -> usize {
        let mut best = self.distance(query, self.nodes[current].vector.as_slice());
        loop {
            let mut changed = false;
            if layer < self.nodes[current].neighbors.len() {
                for &nb in &self.nodes[current].neighbors[layer] {
                    let d = self.distance(query, self.nodes[nb].vector.as_slice());
                    if d < best {
                        best = d;
                        current = nb;
                        changed = true;
                    }
                }
            }
            if !changed {
                return current;
            }
        }
    }

    /// Beam search on one layer, returning up to `ef` closest slots
    /// sorted ascending by distance. Tombstoned nodes are traversed but
    /// kept in the result set so construction links stay navigable; the
    /// query path filters them afterwards.
    fn search_layer(&self, entry: usize, query: &[f32], ef: usize, layer: usize) -> Vec<Candidate> {
        let mut visited = vec![false; self.nodes.len()];
        visited[entry] = true;

        let start = Candidate {
            dist: self.distance(query, self.nodes[entry].vector.as_slice()),
            slot: entry,
        };

        // candidates: closest-first frontier; results: worst-first so the
        // current worst is cheap to inspect and evict.
        let mut candidates: BinaryHeap<Candidate> = BinaryHeap::new();
        candidates.push(start);
        let mut results: Vec<Candidate> = vec![start];

        while let Some(candidate) = candidates.pop() {
            let worst = results
                .iter()
                .map(|c| c.dist)
                .fold(f32::NEG_INFINITY, f32::max);
            if candidate.dist > worst && results.len() >= ef {
                break;
            }

            if layer < self.nodes[candidate.slot].neighbors.len() {
                for &nb in &self.nodes[candidate.slot].neighbors[layer] {
                    if visited[nb] {
                        continue;
                    }
                    visited[nb] = true;
                    let d = self.distance(query, self.nodes[nb].vector.as_slice());
                    let worst = results
                        .iter()
                        .map(|c| c.dist)
                        .fold(f32::NEG_INFINITY, f32::max);
                    if d < worst || results.len() < ef {
                        let c = Candidate { dist: d, slot: nb };
                        candidates.push(c);
                        results.push(c);
                        if results.len() > ef {
                            results.sort_by(|a, b| {
                                a.dist.partial_cmp(&b.dist).unwrap_or(CmpOrdering::Equal)
                            });
                            results.truncate(ef);
                        }
                    }
                }
            }
        }

        results.sort_by(|a, b| a.dist.partial_cmp(&b.dist).unwrap_or(CmpOrdering::Equal));
        results
    }

    fn link(&mut self, slot: usize, layer: usize, selected: &[usize]) {
        self.nodes[slot].neighbors[layer] = selected.to_vec();
        for &nb in selected {
            if layer < self.nodes[nb].neighbors.len() {
                self.nodes[nb].neighbors[layer].push(slot);
                if self.nodes[nb].neighbors[layer].len() > self.params.m * 2 {
                    self.prune(nb, layer);
                }
            }
        }
    }

    /// Keep only the `m` closest neighbors of a node on one layer.
    fn prune(&mut self, slot: usize, layer: usize) {
        let query = self.nodes[slot].vector.clone();
        let mut scored: Vec<(usize, f32)> = self.nodes[slot].neighbors[layer]
            .iter()
            .map(|&nb| {
                (
                    nb,
                    self.distance(query.as_slice(), self.nodes[nb].vector.as_slice()),
                )
            })
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(CmpOrdering::Equal));
        scored.truncate(self.params.m);
        self.nodes[slot].neighbors[layer] = scored.into_iter().map(|(nb, _)| nb).collect();
    }

    fn insert_node(&mut self, id: &str, vector: &Vector) {
        let layer = self.random_layer();
        let slot = self.nodes.len();
        self.nodes.push(Node {
            id: id.to_string(),
            vector: vector.clone(),
            neighbors: vec![Vec::new(); layer + 1],
            deleted: false,
        });
        self.slots.insert(id.to_string(), slot);
        self.live_count += 1;

        let Some(entry) = self.entry_point else {
            self.entry_point = Some(slot);
            self.max_layer = layer;
            return;
        };

        let query = self.nodes[slot].vector.clone();
        let mut current = entry;
        for lev in ((layer + 1)..=self.max_layer).rev() {
            current = self.greedy_closest(current, query.as_slice(), lev);
        }

        for lev in (0..=layer.min(self.max_layer)).rev() {
            let found =
                self.search_layer(current, query.as_slice(), self.params.ef_construction, lev);
            let selected: Vec<usize> = found
                .iter()
                .take(self.params.m)
                .map(|c| c.slot)
                .collect();
            self.link(slot, lev, &selected);
            if let Some(closest) = found.first() {
                current = closest.slot;
            }
        }

        if layer > self.max_layer {
            self.max_layer = layer;
            self.entry_point = Some(slot);
        }
    }

    fn tombstone(&mut self, slot: usize) {
        self.nodes[slot].deleted = true;
        self.live_count -= 1;

        if self.entry_point == Some(slot) {
            // Pick the live node on the highest layer as the new entry;
            // with no live nodes left the graph has no entry at all.
            let replacement = self
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| !n.deleted)
                .max_by_key(|(_, n)| n.top_layer())
                .map(|(i, n)| (i, n.top_layer()));
            match replacement {
                Some((i, layer)) => {
                    self.entry_point = Some(i);
                    self.max_layer = layer;
                }
                None => {
                    self.entry_point = None;
                    self.max_layer = 0;
                }
            }
        }
    }
}

impl SimilarityIndex for HnswIndex {
    fn add(&mut self, id: &str, vector: &Vector) -> Result<()> {
        if vector.dimension() != self.dimension {
            return Err(CalyxError::dimension_mismatch(
                self.dimension,
                vector.dimension(),
            ));
        }
        // Replace: tombstone any stale entry before inserting fresh.
        if let Some(&slot) = self.slots.get(id) {
            if !self.nodes[slot].deleted {
                self.tombstone(slot);
            }
            self.slots.remove(id);
        }
        self.insert_node(id, vector);
        Ok(())
    }

    fn remove(&mut self, id: &str) -> bool {
        match self.slots.remove(id) {
            Some(slot) if !self.nodes[slot].deleted => {
                self.tombstone(slot);
                true
            }
            Some(_) => false,
            None => false,
        }
    }

    fn query(&self, vector: &Vector, top_k: usize) -> Result<Vec<IndexHit>> {
        if top_k == 0 || self.live_count == 0 {
            return Ok(Vec::new());
        }
        if vector.dimension() != self.dimension {
            return Err(CalyxError::dimension_mismatch(
                self.dimension,
                vector.dimension(),
            ));
        }

        let entry = match self.entry_point {
            Some(e) => e,
            None => return Ok(Vec::new()),
        };

        let mut current = entry;
        for lev in (1..=self.max_layer).rev() {
            current = self.greedy_closest(current, vector.as_slice(), lev);
        }

        // Overfetch past tombstones so top_k live hits survive filtering.
        let ef = self.params.ef_search.max(top_k) + (self.nodes.len() - self.live_count);
        let found = self.search_layer(current, vector.as_slice(), ef, 0);

        let mut hits = Vec::with_capacity(found.len());
        for candidate in found {
            let node = &self.nodes[candidate.slot];
            if node.deleted {
                continue;
            }
            let score = self
                .metric
                .similarity(vector.as_slice(), node.vector.as_slice())?;
            hits.push(IndexHit {
                id: node.id.clone(),
                score,
            });
        }
        Ok(rank_hits(hits, top_k))
    }

    fn len(&self) -> usize {
        self.live_count
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.slots.clear();
        self.entry_point = None;
        self.max_layer = 0;
        self.live_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_index() -> HnswIndex {
        let mut index = HnswIndex::new(2, DistanceMetric::Cosine, HnswParams::default());
        index.add("A", &Vector::new(vec![1.0, 0.0])).unwrap();
        index.add("B", &Vector::new(vec![0.0, 1.0])).unwrap();
        index.add("C", &Vector::new(vec![0.9, 0.1])).unwrap();
        index
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let index = HnswIndex::new(2, DistanceMetric::Cosine, HnswParams::default());
        assert!(index.query(&Vector::new(vec![1.0, 0.0]), 5).unwrap().is_empty());
    }

    #[test]
    fn test_small_graph_is_exact() {
        let index = small_index();
        let hits = index.query(&Vector::new(vec![1.0, 0.0]), 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "A");
        assert_eq!(hits[0].score, 1.0);
        assert_eq!(hits[1].id, "C");
    }

    #[test]
    fn test_remove_tombstones_entry() {
        let mut index = small_index();
        assert!(index.remove("A"));
        assert!(!index.remove("A"));
        assert_eq!(index.len(), 2);
        let hits = index.query(&Vector::new(vec![1.0, 0.0]), 3).unwrap();
        assert!(hits.iter().all(|h| h.id != "A"));
        assert_eq!(hits[0].id, "C");
    }

    #[test]
    fn test_add_replaces_existing_id() {
        let mut index = small_index();
        index.add("A", &Vector::new(vec![0.0, 1.0])).unwrap();
        assert_eq!(index.len(), 3);
        let hits = index.query(&Vector::new(vec![0.0, 1.0]), 3).unwrap();
        // A now collides with B at score 1.0; tie broken by ascending id.
        assert_eq!(hits[0].id, "A");
        assert_eq!(hits[1].id, "B");
    }

    #[test]
    fn test_remove_all_then_query() {
        let mut index = small_index();
        for id in ["A", "B", "C"] {
            assert!(index.remove(id));
        }
        assert_eq!(index.len(), 0);
        assert!(index.query(&Vector::new(vec![1.0, 0.0]), 5).unwrap().is_empty());
    }

    #[test]
    fn test_top_k_exceeding_len_returns_all_live() {
        let index = small_index();
        let hits = index.query(&Vector::new(vec![0.5, 0.5]), 50).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_dimension_mismatch_on_add() {
        let mut index = HnswIndex::new(3, DistanceMetric::Cosine, HnswParams::default());
        assert!(index.add("x", &Vector::new(vec![1.0])).is_err());
    }
}
