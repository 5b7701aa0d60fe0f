//! Telemetry hook points.
//!
//! The engine times every public operation and notifies an
//! [`EngineObserver`]. Observability layers attach here; the engine
//! functions identically with the no-op observer installed.

use std::fmt;
use std::time::Duration;

/// Receives one event per completed engine operation.
pub trait EngineObserver: Send + Sync + fmt::Debug {
    /// `name` is the operation (`search_by_image`, `search_by_text`,
    /// `upsert_product`, ...), `ok` whether it succeeded.
    fn operation(&self, name: &str, duration: Duration, ok: bool);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EngineObserver for NoopObserver {
    fn operation(&self, _name: &str, _duration: Duration, _ok: bool) {}
}

/// Observer that emits one debug log line per operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl EngineObserver for LogObserver {
    fn operation(&self, name: &str, duration: Duration, ok: bool) {
        log::debug!(
            "operation={name} duration_us={} ok={ok}",
            duration.as_micros()
        );
    }
}
