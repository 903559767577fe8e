use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::observer::{StatsObserver, TracingObserver};
use crate::services::{AnalyticsService, IngestService};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub ingest_service: Arc<IngestService>,
    pub analytics_service: Arc<AnalyticsService>,
}

impl StartupContext {
    /// 在已有存储上组装服务（测试与 CLI 复用）
    pub fn from_storage(storage: Arc<SeaOrmStorage>) -> Self {
        let observer: Arc<dyn StatsObserver> = TracingObserver::arc();
        let ingest_service = Arc::new(IngestService::with_observer(
            storage.clone(),
            observer.clone(),
        ));
        let analytics_service = Arc::new(AnalyticsService::with_observer(
            storage.clone(),
            observer,
        ));
        Self {
            storage,
            ingest_service,
            analytics_service,
        }
    }
}

/// 准备服务器启动的上下文：连接数据库、执行迁移、组装服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let totals = storage
        .count_views()
        .await
        .context("Failed to read initial row counts")?;
    debug!("Storage holds {} views at startup", totals);

    let context = StartupContext::from_storage(storage);

    info!(
        "Pre-startup processing completed in {:?}",
        start_time.elapsed()
    );
    Ok(context)
}
