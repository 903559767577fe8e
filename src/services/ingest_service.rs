//! CSV ingestion service
//!
//! Parses an uploaded stream completely before touching the database, so a
//! malformed row anywhere rejects the whole upload and nothing is persisted.

use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::errors::{Result, StatsError};
use crate::ingest::{ActionAggregator, IngestKind, parse_actions, parse_views};
use crate::observer::{NoopObserver, StatsObserver};
use crate::storage::{RowCounts, SeaOrmStorage};

pub struct IngestService {
    storage: Arc<SeaOrmStorage>,
    observer: Arc<dyn StatsObserver>,
}

impl IngestService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self::with_observer(storage, NoopObserver::arc())
    }

    pub fn with_observer(storage: Arc<SeaOrmStorage>, observer: Arc<dyn StatsObserver>) -> Self {
        Self { storage, observer }
    }

    fn reject(&self, kind: IngestKind, source: &str, err: StatsError) -> StatsError {
        warn!("Rejected {} upload '{}': {}", kind, source, err);
        self.observer.on_ingest_failed(kind, source, &err.message());
        err
    }

    /// 导入展示文件，返回数据行数（不含表头）
    ///
    /// 已存在的 id 被覆盖；同一文件内重复的 id 以最后一行为准。
    pub async fn ingest_views<R: Read>(&self, source: R, source_name: &str) -> Result<usize> {
        let kind = IngestKind::Views;
        let started = Instant::now();
        self.observer.on_ingest_started(kind, source_name);

        let views = parse_views(source).map_err(|e| self.reject(kind, source_name, e))?;
        let rows = views.len();

        let persisted = self
            .storage
            .upsert_views(&views)
            .await
            .map_err(|e| self.reject(kind, source_name, e))?;

        let elapsed = started.elapsed().as_secs_f64();
        info!(
            "Imported {} view rows from '{}' ({} distinct ids) in {:.3}s",
            rows, source_name, persisted, elapsed
        );
        self.observer
            .on_ingest_finished(kind, source_name, rows, persisted, elapsed);
        Ok(rows)
    }

    /// 导入行为文件，返回写入的不同 (view_id, tag) 数量
    ///
    /// 引用不存在的 view 的行被跳过，不视为错误。
    pub async fn ingest_actions<R: Read>(&self, source: R, source_name: &str) -> Result<usize> {
        let kind = IngestKind::Actions;
        let started = Instant::now();
        self.observer.on_ingest_started(kind, source_name);

        let rows = parse_actions(source).map_err(|e| self.reject(kind, source_name, e))?;
        let total = rows.len();

        let mut referenced: Vec<String> = rows.iter().map(|r| r.view_id.clone()).collect();
        referenced.sort_unstable();
        referenced.dedup();

        let known = self
            .storage
            .existing_view_ids(&referenced)
            .await
            .map_err(|e| self.reject(kind, source_name, e))?;

        let mut aggregator = ActionAggregator::new();
        for row in rows {
            if let Some(orphan) = aggregator.add(row, &known) {
                debug!(
                    "line {}: skipping action '{}' for unknown view '{}'",
                    orphan.line, orphan.tag, orphan.view_id
                );
                self.observer.on_orphan_action(&orphan.view_id, &orphan.tag);
            }
        }

        let skipped = aggregator.skipped();
        let actions = aggregator.into_actions();
        let persisted = self
            .storage
            .insert_actions(&actions)
            .await
            .map_err(|e| self.reject(kind, source_name, e))?;

        let elapsed = started.elapsed().as_secs_f64();
        info!(
            "Imported {} action rows from '{}' as {} records ({} skipped) in {:.3}s",
            total, source_name, persisted, skipped, elapsed
        );
        self.observer
            .on_ingest_finished(kind, source_name, total, persisted, elapsed);
        Ok(persisted)
    }

    /// 清空所有数据
    pub async fn clear_all(&self) -> Result<RowCounts> {
        self.storage.clear_all().await
    }
}
