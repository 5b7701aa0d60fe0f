//! ProductCatalog: product ID to metadata mapping.
//!
//! A direct keyed lookup with no algorithmic depth of its own; it lives
//! in the core because its referential integrity with the vector store
//! is an invariant the engine's locking must enforce.

use std::collections::HashMap;

use crate::data::Metadata;

/// In-memory metadata catalog keyed by product ID.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    entries: HashMap<String, Metadata>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the metadata for `id`.
    pub fn put(&mut self, id: impl Into<String>, metadata: Metadata) {
        self.entries.insert(id.into(), metadata);
    }

    pub fn get(&self, id: &str) -> Option<&Metadata> {
        self.entries.get(id)
    }

    /// Remove the entry for `id`, returning whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MetadataValue;

    #[test]
    fn test_put_get_remove() {
        let mut catalog = ProductCatalog::new();
        let mut meta = Metadata::new();
        meta.insert("title".to_string(), MetadataValue::from("blue mug"));

        catalog.put("p1", meta.clone());
        assert!(catalog.exists("p1"));
        assert_eq!(catalog.get("p1"), Some(&meta));

        assert!(catalog.remove("p1"));
        assert!(!catalog.remove("p1"));
        assert!(!catalog.exists("p1"));
    }

    #[test]
    fn test_put_replaces() {
        let mut catalog = ProductCatalog::new();
        let mut first = Metadata::new();
        first.insert("v".to_string(), 1i64.into());
        let mut second = Metadata::new();
        second.insert("v".to_string(), 2i64.into());

        catalog.put("p1", first);
        catalog.put("p1", second.clone());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("p1"), Some(&second));
    }
}
