//! Blocking bridge for async embedding operations.

use std::future::Future;
use std::sync::{Arc, mpsc};

use tokio::runtime::Builder as TokioRuntimeBuilder;

use crate::error::{CalyxError, Result};

/// Executor for running async embedding operations from the engine's
/// synchronous API.
#[derive(Debug, Clone)]
pub struct EmbedderExecutor {
    runtime: Arc<tokio::runtime::Runtime>,
}

impl EmbedderExecutor {
    /// Create a new embedder executor with a dedicated tokio runtime.
    pub fn new() -> Result<Self> {
        let runtime = TokioRuntimeBuilder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|err| {
                CalyxError::internal(format!("failed to initialize embedder runtime: {err}"))
            })?;
        Ok(Self {
            runtime: Arc::new(runtime),
        })
    }

    /// Run an async future and wait for its result.
    pub fn run<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = self.runtime.handle().clone();
        handle.spawn(async move {
            let _ = tx.send(future.await);
        });
        rx.recv()
            .map_err(|err| CalyxError::internal(format!("embedder task channel closed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_returns_future_output() {
        let executor = EmbedderExecutor::new().unwrap();
        let out = executor.run(async { Ok(41 + 1) }).unwrap();
        assert_eq!(out, 42);
    }

    #[test]
    fn test_run_propagates_errors() {
        let executor = EmbedderExecutor::new().unwrap();
        let err: Result<()> = executor.run(async { Err(CalyxError::embedding("bad input")) });
        assert!(matches!(err, Err(CalyxError::Embedding(_))));
    }
}
