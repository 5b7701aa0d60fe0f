//! SearchEngine configuration.

use serde::{Deserialize, Serialize};

use crate::data::MetadataSchema;
use crate::error::{CalyxError, Result};
use crate::vector::core::distance::DistanceMetric;
use crate::vector::index::IndexKind;

fn default_top_k() -> usize {
    5
}

/// Engine configuration, fixed at deployment time.
///
/// The embedding dimension and distance metric are configuration
/// constants: they are never inferred from inputs at runtime, and a
/// mismatching embedder output is surfaced as an internal error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Embedding dimension D shared by images and text.
    pub dimension: usize,

    /// Similarity scoring function.
    #[serde(default)]
    pub metric: DistanceMetric,

    /// Results returned when the caller does not specify `top_k`.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Similarity index backend.
    #[serde(default)]
    pub index: IndexKind,

    /// Required-field schema checked against upsert metadata.
    #[serde(default)]
    pub schema: MetadataSchema,
}

impl EngineConfig {
    /// Create a new builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(CalyxError::invalid_config(
                "embedding dimension must be greater than zero",
            ));
        }
        if let IndexKind::Hnsw {
            m, ef_construction, ..
        } = &self.index
        {
            if *m < 2 {
                return Err(CalyxError::invalid_config("hnsw m must be at least 2"));
            }
            if *ef_construction == 0 {
                return Err(CalyxError::invalid_config(
                    "hnsw ef_construction must be greater than zero",
                ));
            }
        }
        Ok(())
    }
}

/// Builder for [`EngineConfig`].
pub struct EngineConfigBuilder {
    dimension: Option<usize>,
    metric: DistanceMetric,
    default_top_k: usize,
    index: IndexKind,
    schema: MetadataSchema,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self {
            dimension: None,
            metric: DistanceMetric::default(),
            default_top_k: default_top_k(),
            index: IndexKind::default(),
            schema: MetadataSchema::default(),
        }
    }

    /// Set the embedding dimension (required).
    pub fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn index(mut self, index: IndexKind) -> Self {
        self.index = index;
        self
    }

    pub fn schema(mut self, schema: MetadataSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<EngineConfig> {
        let dimension = self
            .dimension
            .ok_or_else(|| CalyxError::invalid_config("embedding dimension is required"))?;
        let config = EngineConfig {
            dimension,
            metric: self.metric,
            default_top_k: self.default_top_k,
            index: self.index,
            schema: self.schema,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EngineConfig::builder().dimension(128).build().unwrap();
        assert_eq!(config.dimension, 128);
        assert_eq!(config.default_top_k, 5);
        assert_eq!(config.metric, DistanceMetric::Cosine);
        assert_eq!(config.index, IndexKind::Flat);
    }

    #[test]
    fn test_missing_dimension_rejected() {
        assert!(EngineConfig::builder().build().is_err());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(EngineConfig::builder().dimension(0).build().is_err());
    }

    #[test]
    fn test_bad_hnsw_params_rejected() {
        let result = EngineConfig::builder()
            .dimension(8)
            .index(IndexKind::Hnsw {
                m: 1,
                ef_construction: 200,
                ef_search: 100,
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = EngineConfig::builder()
            .dimension(64)
            .index(IndexKind::hnsw_defaults())
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dimension, 64);
        assert_eq!(back.index, config.index);
    }
}
