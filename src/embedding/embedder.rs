//! The embedder trait.

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::vector::core::vector::Vector;

/// Raw input handed to the embedding model.
#[derive(Debug, Clone, Copy)]
pub enum EmbedInput<'a> {
    /// A text query or description.
    Text(&'a str),
    /// Raw image bytes.
    Image(&'a [u8]),
}

/// Maps raw content into the shared embedding space.
///
/// Implementations must be deterministic for a fixed model version and
/// fail with an embedding error for malformed, empty, or unsupported
/// input. No side effects beyond the returned vector are observable.
#[async_trait]
pub trait Embedder: Send + Sync + fmt::Debug {
    /// Embed the input into a fixed-dimension vector.
    async fn embed(&self, input: &EmbedInput<'_>) -> Result<Vector>;

    /// Model identifier, for logging.
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}
