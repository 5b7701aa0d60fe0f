//! Deterministic hashing embedder.
//!
//! Projects raw bytes or text into the configured dimension with a
//! feature-hashing scheme. Not a semantic model; it exists so the engine
//! can run end to end (and be tested) without neural inference, and as a
//! reference for the embedder contract: deterministic per version,
//! rejects empty input, emits normalized vectors of the fixed dimension.

use std::any::Any;

use async_trait::async_trait;

use crate::embedding::embedder::{EmbedInput, Embedder};
use crate::error::{CalyxError, Result};
use crate::vector::core::vector::Vector;

/// Embedder that feature-hashes input bytes into a normalized vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn project(&self, bytes: &[u8], seed: u64) -> Vector {
        let mut data = vec![0.0f32; self.dimension];
        // FNV-1a rolling hash over 3-byte shingles; each shingle bumps
        // one bucket with a sign derived from the hash.
        let mut h: u64 = 0xcbf29ce484222325 ^ seed;
        for window in bytes.windows(3.min(bytes.len()).max(1)) {
            for &b in window {
                h ^= b as u64;
                h = h.wrapping_mul(0x100000001b3);
            }
            let bucket = (h % self.dimension as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            data[bucket] += sign;
        }
        Vector::new(data).normalized()
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, input: &EmbedInput<'_>) -> Result<Vector> {
        match input {
            EmbedInput::Text(text) => {
                if text.trim().is_empty() {
                    return Err(CalyxError::embedding("cannot embed empty text"));
                }
                Ok(self.project(text.as_bytes(), 0x7465_7874))
            }
            EmbedInput::Image(bytes) => {
                if bytes.is_empty() {
                    return Err(CalyxError::embedding("cannot embed empty image payload"));
                }
                Ok(self.project(bytes, 0x696d_6167))
            }
        }
    }

    fn name(&self) -> &str {
        "hashing-embedder"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::executor::EmbedderExecutor;
    use std::sync::Arc;

    fn embed(embedder: &Arc<HashingEmbedder>, input: EmbedInput<'static>) -> Result<Vector> {
        let executor = EmbedderExecutor::new().unwrap();
        let embedder = embedder.clone();
        executor.run(async move { embedder.embed(&input).await })
    }

    #[test]
    fn test_deterministic_output() {
        let embedder = Arc::new(HashingEmbedder::new(16));
        let a = embed(&embedder, EmbedInput::Text("red sneaker")).unwrap();
        let b = embed(&embedder, EmbedInput::Text("red sneaker")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dimension(), 16);
    }

    #[test]
    fn test_distinct_inputs_differ() {
        let embedder = Arc::new(HashingEmbedder::new(64));
        let a = embed(&embedder, EmbedInput::Text("red sneaker")).unwrap();
        let b = embed(&embedder, EmbedInput::Text("blue kettle")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let embedder = Arc::new(HashingEmbedder::new(16));
        assert!(embed(&embedder, EmbedInput::Text("   ")).is_err());
        assert!(embed(&embedder, EmbedInput::Image(&[])).is_err());
    }

    #[test]
    fn test_text_and_image_spaces_are_distinct() {
        let embedder = Arc::new(HashingEmbedder::new(32));
        let t = embed(&embedder, EmbedInput::Text("abc")).unwrap();
        let i = embed(&embedder, EmbedInput::Image(b"abc")).unwrap();
        assert_ne!(t, i);
    }
}
