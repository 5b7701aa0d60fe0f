//! Embedding boundary.
//!
//! The neural model is an external collaborator behind the [`Embedder`]
//! trait: a function from raw image bytes or text to a fixed-dimension
//! vector in a shared embedding space. The engine runs it through
//! [`executor::EmbedderExecutor`] with no store lock held, since model
//! inference dominates the latency of every search and upsert.

pub mod embedder;
pub mod executor;
pub mod hashing;

pub use embedder::{EmbedInput, Embedder};
pub use executor::EmbedderExecutor;
pub use hashing::HashingEmbedder;
