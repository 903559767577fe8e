//! IngestService 集成测试
//!
//! 覆盖 views / actions 导入、幂等覆盖、格式错误整批拒绝、
//! 孤立行为跳过以及清空数据。

use std::sync::{Arc, Mutex, Once};

use tempfile::TempDir;

use viewstats::config::{get_config, init_config};
use viewstats::errors::StatsError;
use viewstats::ingest::IngestKind;
use viewstats::observer::StatsObserver;
use viewstats::services::IngestService;
use viewstats::storage::{Action, SeaOrmStorage, StorageFactory};

// =============================================================================
// 全局初始化
// =============================================================================

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let p = td.path().join("ingest_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = StorageFactory::create_with_url(&u).await.unwrap();
    (s, td)
}

const VIEW_HEADER: &str = "reg_time,uid,fc_imp_chk,fc_time_chk,utmtr,mm_dma,osName,model,hardware,site_id\n";
const ACTION_HEADER: &str = "uid,tag\n";

fn views_csv(rows: &[&str]) -> String {
    let mut s = VIEW_HEADER.to_string();
    for r in rows {
        s.push_str(r);
        s.push('\n');
    }
    s
}

fn actions_csv(rows: &[&str]) -> String {
    let mut s = ACTION_HEADER.to_string();
    for r in rows {
        s.push_str(r);
        s.push('\n');
    }
    s
}

#[derive(Default)]
struct RecordingObserver {
    orphans: Mutex<Vec<(String, String)>>,
    failures: Mutex<Vec<IngestKind>>,
}

impl StatsObserver for RecordingObserver {
    fn on_ingest_failed(&self, kind: IngestKind, _source: &str, _error: &str) {
        self.failures.lock().unwrap().push(kind);
    }

    fn on_orphan_action(&self, view_id: &str, tag: &str) {
        self.orphans
            .lock()
            .unwrap()
            .push((view_id.to_string(), tag.to_string()));
    }
}

// =============================================================================
// Views
// =============================================================================

#[tokio::test]
async fn test_ingest_views_returns_row_count() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let csv = views_csv(&[
        "2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com",
        "2021-07-20 21:15:00,u2,1,0,3,511,iOS,iPhone,Mobile,other.com",
        "2021-07-21 08:00:00,u3,0,1,0,510,Windows,PC,Desktop,site.com",
    ]);
    let count = service.ingest_views(csv.as_bytes(), "views.csv").await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(storage.count_views().await.unwrap(), 3);

    let u2 = storage.find_view("u2").await.unwrap().unwrap();
    assert_eq!(u2.region, 511);
    assert_eq!(u2.utmtr, 3);
    assert_eq!(u2.site_id, "other.com");
}

#[tokio::test]
async fn test_header_only_file_is_empty_batch() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let count = service
        .ingest_views(VIEW_HEADER.as_bytes(), "empty.csv")
        .await
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(storage.count_views().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reingest_is_idempotent() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let csv = views_csv(&[
        "2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com",
        "2021-07-20 20:05:00,u2,0,0,0,510,Android,Pixel,Mobile,site.com",
    ]);
    service.ingest_views(csv.as_bytes(), "a.csv").await.unwrap();
    service.ingest_views(csv.as_bytes(), "a.csv").await.unwrap();
    assert_eq!(storage.count_views().await.unwrap(), 2);
}

#[tokio::test]
async fn test_existing_view_is_overwritten() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let first = views_csv(&["2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com"]);
    let second = views_csv(&["2021-07-22 09:30:00,u1,1,1,1,600,iOS,iPhone,Mobile,new.com"]);
    service.ingest_views(first.as_bytes(), "1.csv").await.unwrap();
    service.ingest_views(second.as_bytes(), "2.csv").await.unwrap();

    let view = storage.find_view("u1").await.unwrap().unwrap();
    assert_eq!(view.region, 600);
    assert_eq!(view.site_id, "new.com");
    assert_eq!(view.observed_at.to_string(), "2021-07-22 09:30:00");
}

#[tokio::test]
async fn test_duplicate_id_in_batch_keeps_last_row() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let csv = views_csv(&[
        "2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,first.com",
        "2021-07-20 20:01:00,u1,0,0,0,511,Android,Pixel,Mobile,last.com",
    ]);
    let count = service.ingest_views(csv.as_bytes(), "dup.csv").await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(storage.count_views().await.unwrap(), 1);
    assert_eq!(
        storage.find_view("u1").await.unwrap().unwrap().site_id,
        "last.com"
    );
}

#[tokio::test]
async fn test_view_row_with_nine_fields_rejects_batch() {
    let (storage, _td) = create_temp_storage().await;
    let observer = Arc::new(RecordingObserver::default());
    let service = IngestService::with_observer(storage.clone(), observer.clone());

    let csv = views_csv(&[
        "2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com",
        "2021-07-20 20:00:00,u2,0,0,0,510,Android,Pixel,Mobile",
    ]);
    let err = service
        .ingest_views(csv.as_bytes(), "short.csv")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StatsError::MalformedRow {
            line: 3,
            expected: 10,
            actual: 9
        }
    ));
    assert_eq!(storage.count_views().await.unwrap(), 0);
    assert_eq!(*observer.failures.lock().unwrap(), vec![IngestKind::Views]);
}

#[tokio::test]
async fn test_view_row_with_eleven_fields_rejects_batch() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let csv = views_csv(&["2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com,extra"]);
    let err = service
        .ingest_views(csv.as_bytes(), "long.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, StatsError::MalformedRow { actual: 11, .. }));
    assert_eq!(storage.count_views().await.unwrap(), 0);
}

#[tokio::test]
async fn test_non_numeric_region_rejects_batch() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let csv = views_csv(&[
        "2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com",
        "2021-07-20 20:00:00,u2,0,0,0,abc,Android,Pixel,Mobile,site.com",
    ]);
    let err = service
        .ingest_views(csv.as_bytes(), "bad.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, StatsError::InvalidField { line: 3, .. }));
    assert_eq!(storage.count_views().await.unwrap(), 0);
}

// =============================================================================
// Actions
// =============================================================================

#[tokio::test]
async fn test_actions_fold_into_counts() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let views = views_csv(&[
        "2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com",
        "2021-07-20 20:00:00,u2,0,0,0,510,Android,Pixel,Mobile,site.com",
    ]);
    service.ingest_views(views.as_bytes(), "v.csv").await.unwrap();

    let actions = actions_csv(&["u1,fclick", "u1,fclick", "u1,vclick", "u2,fclick", "u1,fclick"]);
    let persisted = service
        .ingest_actions(actions.as_bytes(), "a.csv")
        .await
        .unwrap();
    assert_eq!(persisted, 3);
    assert_eq!(storage.count_actions().await.unwrap(), 3);

    let u1 = storage.actions_for_view("u1").await.unwrap();
    let fclick = u1.iter().find(|a| a.tag == "fclick").unwrap();
    assert_eq!(fclick.count, 3);
    let vclick = u1.iter().find(|a| a.tag == "vclick").unwrap();
    assert_eq!(vclick.count, 1);
}

#[tokio::test]
async fn test_orphan_action_is_skipped() {
    let (storage, _td) = create_temp_storage().await;
    let observer = Arc::new(RecordingObserver::default());
    let service = IngestService::with_observer(storage.clone(), observer.clone());

    let actions = actions_csv(&["u2,fclick"]);
    let persisted = service
        .ingest_actions(actions.as_bytes(), "orphan.csv")
        .await
        .unwrap();
    assert_eq!(persisted, 0);
    assert_eq!(storage.count_actions().await.unwrap(), 0);
    assert_eq!(
        *observer.orphans.lock().unwrap(),
        vec![("u2".to_string(), "fclick".to_string())]
    );
    assert!(observer.failures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_action_row_arity_rejects_batch() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let views = views_csv(&["2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com"]);
    service.ingest_views(views.as_bytes(), "v.csv").await.unwrap();

    for bad in ["u1", "u1,fclick,extra"] {
        let actions = actions_csv(&["u1,fclick", bad]);
        let err = service
            .ingest_actions(actions.as_bytes(), "bad.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::MalformedRow { expected: 2, .. }));
    }
    assert_eq!(storage.count_actions().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reuploading_actions_appends_records() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let views = views_csv(&["2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com"]);
    service.ingest_views(views.as_bytes(), "v.csv").await.unwrap();

    let actions = actions_csv(&["u1,fclick"]);
    service.ingest_actions(actions.as_bytes(), "a.csv").await.unwrap();
    service.ingest_actions(actions.as_bytes(), "a.csv").await.unwrap();
    assert_eq!(storage.count_actions().await.unwrap(), 2);
}

// =============================================================================
// 跨分块写入
// =============================================================================

fn chunk_size() -> usize {
    init_static_config();
    get_config().ingest.write_chunk_size.max(1)
}

fn many_views_csv(n: usize) -> String {
    let mut s = VIEW_HEADER.to_string();
    for i in 0..n {
        s.push_str(&format!(
            "2021-07-20 20:00:00,u{i:05},0,0,0,510,Android,Pixel,Mobile,site.com\n"
        ));
    }
    s
}

#[tokio::test]
async fn test_upload_larger_than_one_chunk() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());
    let n = chunk_size() * 2 + 203;

    let count = service
        .ingest_views(many_views_csv(n).as_bytes(), "big_views.csv")
        .await
        .unwrap();
    assert_eq!(count, n);
    assert_eq!(storage.count_views().await.unwrap(), n as u64);

    let ids: Vec<String> = (0..n).map(|i| format!("u{i:05}")).collect();
    assert_eq!(storage.existing_view_ids(&ids).await.unwrap().len(), n);

    let mut actions = ACTION_HEADER.to_string();
    for id in &ids {
        actions.push_str(&format!("{id},fclick\n{id},fclick\n"));
    }
    actions.push_str("ghost,fclick\n");

    let persisted = service
        .ingest_actions(actions.as_bytes(), "big_actions.csv")
        .await
        .unwrap();
    assert_eq!(persisted, n);
    assert_eq!(storage.count_actions().await.unwrap(), n as u64);

    let last = storage.actions_for_view(&ids[n - 1]).await.unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].count, 2);
}

#[tokio::test]
async fn test_failing_later_chunk_rolls_back_whole_batch() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());
    let n = chunk_size() + 100;

    service
        .ingest_views(many_views_csv(n).as_bytes(), "views.csv")
        .await
        .unwrap();

    // 第二个分块里的一条记录违反外键
    let mut actions: Vec<Action> = (0..n)
        .map(|i| Action {
            view_id: format!("u{i:05}"),
            tag: "fclick".to_string(),
            count: 1,
        })
        .collect();
    actions[n - 50].view_id = "ghost".to_string();

    let err = storage.insert_actions(&actions).await.unwrap_err();
    assert!(matches!(err, StatsError::DatabaseOperation(_)));
    assert_eq!(storage.count_actions().await.unwrap(), 0);
    assert_eq!(storage.count_views().await.unwrap(), n as u64);
}

// =============================================================================
// Clear
// =============================================================================

#[tokio::test]
async fn test_clear_all_reports_deleted_rows() {
    let (storage, _td) = create_temp_storage().await;
    let service = IngestService::new(storage.clone());

    let views = views_csv(&[
        "2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com",
        "2021-07-20 20:00:00,u2,0,0,0,510,Android,Pixel,Mobile,site.com",
    ]);
    service.ingest_views(views.as_bytes(), "v.csv").await.unwrap();
    service
        .ingest_actions(actions_csv(&["u1,fclick"]).as_bytes(), "a.csv")
        .await
        .unwrap();

    let deleted = service.clear_all().await.unwrap();
    assert_eq!(deleted.views, 2);
    assert_eq!(deleted.actions, 1);
    assert_eq!(storage.count_views().await.unwrap(), 0);
    assert_eq!(storage.count_actions().await.unwrap(), 0);
}
