//! Ingestion / query observer hooks.
//!
//! `IngestService` and `AnalyticsService` accept `Arc<dyn StatsObserver>`
//! so that embedding applications can plug in their own counters.
//! `NoopObserver` is the default; `TracingObserver` forwards every event
//! to `tracing` at debug level.

use std::sync::Arc;

use tracing::debug;

use crate::ingest::IngestKind;

/// Receives ingestion and query events.
///
/// All methods are no-op by default, allowing partial implementation.
/// Implementations must be thread-safe (Send + Sync).
#[allow(unused_variables)]
pub trait StatsObserver: Send + Sync {
    // ===== Ingest =====

    /// A CSV batch started parsing
    fn on_ingest_started(&self, kind: IngestKind, source: &str) {}

    /// A CSV batch was fully persisted
    fn on_ingest_finished(
        &self,
        kind: IngestKind,
        source: &str,
        rows: usize,
        persisted: usize,
        duration_secs: f64,
    ) {
    }

    /// A CSV batch was rejected; nothing from it was persisted
    fn on_ingest_failed(&self, kind: IngestKind, source: &str, error: &str) {}

    /// An action row referenced a view id that does not exist
    fn on_orphan_action(&self, view_id: &str, tag: &str) {}

    // ===== Analytics =====

    /// An analytics query completed
    fn on_query(&self, query: &str, rows: usize, duration_secs: f64) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl StatsObserver for NoopObserver {}

impl NoopObserver {
    pub fn new() -> Self {
        Self
    }

    pub fn arc() -> Arc<dyn StatsObserver> {
        Arc::new(Self::new())
    }
}

impl Default for NoopObserver {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer that writes every event to the `tracing` subscriber.
#[derive(Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn arc() -> Arc<dyn StatsObserver> {
        Arc::new(Self)
    }
}

impl StatsObserver for TracingObserver {
    fn on_ingest_started(&self, kind: IngestKind, source: &str) {
        debug!(kind = kind.as_ref(), source, "ingest started");
    }

    fn on_ingest_finished(
        &self,
        kind: IngestKind,
        source: &str,
        rows: usize,
        persisted: usize,
        duration_secs: f64,
    ) {
        debug!(
            kind = kind.as_ref(),
            source, rows, persisted, duration_secs, "ingest finished"
        );
    }

    fn on_ingest_failed(&self, kind: IngestKind, source: &str, error: &str) {
        debug!(kind = kind.as_ref(), source, error, "ingest rejected");
    }

    fn on_orphan_action(&self, view_id: &str, tag: &str) {
        debug!(view_id, tag, "action skipped: unknown view id");
    }

    fn on_query(&self, query: &str, rows: usize, duration_secs: f64) {
        debug!(query, rows, duration_secs, "analytics query finished");
    }
}
