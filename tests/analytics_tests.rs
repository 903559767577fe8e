//! AnalyticsService 集成测试
//!
//! 在临时 SQLite 上导入固定数据集，覆盖每日计数、维度汇总、
//! CTR / EvPM 标签规则、时间桶和区间边界。

use std::sync::{Arc, Once};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use viewstats::analytics::{Count, Granularity};
use viewstats::config::init_config;
use viewstats::errors::StatsError;
use viewstats::services::{AnalyticsService, IngestService};
use viewstats::storage::{SeaOrmStorage, StorageFactory};

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
    let p = td.path().join("analytics_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = StorageFactory::create_with_url(&u).await.unwrap();
    (s, td)
}

const VIEWS: &str = "\
reg_time,uid,fc_imp_chk,fc_time_chk,utmtr,mm_dma,osName,model,hardware,site_id
2021-07-20 20:00:00,u1,0,0,0,510,Android,Pixel,Mobile,site.com
2021-07-20 20:30:00,u2,0,0,0,510,iOS,iPhone,Mobile,site.com
2021-07-20 21:10:00,u3,0,0,0,511,Windows,PC,Desktop,other.com
2021-07-21 09:00:00,u4,0,0,0,510,Android,Galaxy,Mobile,other.com
2021-07-20 20:45:00,u5,0,0,0,512,Linux,PC,Desktop,site.com
";

const ACTIONS: &str = "\
uid,tag
u1,fclick
u1,fclick
u1,vclick
u2,vclick
u3,click
";

/// 导入固定数据集，返回分析服务
async fn seeded_service() -> (AnalyticsService, TempDir) {
    let (storage, td) = create_temp_storage().await;
    let ingest = IngestService::new(storage.clone());
    ingest.ingest_views(VIEWS.as_bytes(), "views.csv").await.unwrap();
    ingest
        .ingest_actions(ACTIONS.as_bytes(), "actions.csv")
        .await
        .unwrap();
    (AnalyticsService::new(storage), td)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

// =============================================================================
// 计数
// =============================================================================

#[tokio::test]
async fn test_count_by_region_per_day() {
    let (service, _td) = seeded_service().await;
    let counts = service
        .count_by_region(date("2021-07-20"), date("2021-07-21"), 510)
        .await
        .unwrap();
    assert_eq!(counts, vec![2, 1]);
}

#[tokio::test]
async fn test_count_by_site_single_day_range() {
    let (service, _td) = seeded_service().await;
    let counts = service
        .count_by_site(date("2021-07-20"), date("2021-07-20"), "site.com")
        .await
        .unwrap();
    assert_eq!(counts, vec![3]);
}

#[tokio::test]
async fn test_count_on_empty_range_is_empty() {
    let (service, _td) = seeded_service().await;
    let counts = service
        .count_by_region(date("2020-01-01"), date("2020-01-31"), 510)
        .await
        .unwrap();
    assert!(counts.is_empty());
}

#[tokio::test]
async fn test_inverted_date_range_is_validation_error() {
    let (service, _td) = seeded_service().await;
    let err = service
        .count_by_region(date("2021-07-21"), date("2021-07-20"), 510)
        .await
        .unwrap_err();
    assert!(matches!(err, StatsError::Validation(_)));
}

#[tokio::test]
async fn test_views_per_dimension_sum_to_ingested_rows() {
    let (service, _td) = seeded_service().await;
    let from = date("2021-07-01");
    let to = date("2021-07-31");

    let per_region = service.views_per_region(from, to).await.unwrap();
    assert_eq!(
        per_region,
        vec![
            Count { key: 510, count: 3 },
            Count { key: 511, count: 1 },
            Count { key: 512, count: 1 },
        ]
    );

    let per_site = service.views_per_site(from, to).await.unwrap();
    assert_eq!(per_site[0].key, "other.com");
    assert_eq!(per_site[0].count, 2);
    assert_eq!(per_site[1].key, "site.com");
    assert_eq!(per_site[1].count, 3);

    let total: u64 = per_region.iter().map(|c| c.count).sum();
    assert_eq!(total, 5);
    assert_eq!(service.totals().await.unwrap().views, 5);
}

// =============================================================================
// CTR
// =============================================================================

#[tokio::test]
async fn test_single_view_single_click_scenario() {
    let (storage, _td) = create_temp_storage().await;
    let ingest = IngestService::new(storage.clone());
    ingest
        .ingest_views(
            "reg_time,uid,fc_imp_chk,fc_time_chk,utmtr,mm_dma,osName,model,hardware,site_id\n\
             2021-07-20 20:00:00,u1,0,0,0,510,os,m,hw,site.com\n"
                .as_bytes(),
            "views.csv",
        )
        .await
        .unwrap();
    ingest
        .ingest_actions("uid,tag\nu1,fclick\n".as_bytes(), "actions.csv")
        .await
        .unwrap();

    let service = AnalyticsService::new(storage);
    let ratios = service
        .ctr_by_region(ts("2021-07-20 00:00:00"), ts("2021-07-20 23:59:59"), None)
        .await
        .unwrap();
    assert_eq!(ratios.len(), 1);
    assert_eq!(ratios[0].key, 510);
    assert_close(ratios[0].value, 1.0);
}

#[tokio::test]
async fn test_view_only_dataset_has_zero_ctr() {
    let (storage, _td) = create_temp_storage().await;
    let ingest = IngestService::new(storage.clone());
    ingest.ingest_views(VIEWS.as_bytes(), "views.csv").await.unwrap();

    let service = AnalyticsService::new(storage);
    let ratios = service
        .ctr_by_site(ts("2021-07-20 00:00:00"), ts("2021-07-21 23:59:59"), None)
        .await
        .unwrap();
    assert_eq!(ratios.len(), 2);
    for r in ratios {
        assert_close(r.value, 0.0);
    }
}

#[tokio::test]
async fn test_ctr_by_region_default_rule_excludes_v_prefixed_tags() {
    let (service, _td) = seeded_service().await;
    let ratios = service
        .ctr_by_region(ts("2021-07-20 00:00:00"), ts("2021-07-21 23:59:59"), None)
        .await
        .unwrap();

    let keys: Vec<i32> = ratios.iter().map(|r| r.key).collect();
    assert_eq!(keys, vec![510, 511, 512]);
    // 510: u1 fclick×2 / 3 views，vclick 不计
    assert_close(ratios[0].value, 2.0 / 3.0);
    assert_close(ratios[1].value, 1.0);
    // 没有行为的 view 只进分母
    assert_close(ratios[2].value, 0.0);
}

#[tokio::test]
async fn test_ctr_by_region_with_tag_matches_plain_and_v_prefixed() {
    let (service, _td) = seeded_service().await;
    let ratios = service
        .ctr_by_region(
            ts("2021-07-20 00:00:00"),
            ts("2021-07-21 23:59:59"),
            Some("click"),
        )
        .await
        .unwrap();
    // 510: u1 vclick + u2 vclick
    assert_close(ratios[0].value, 2.0 / 3.0);
    // 511: u3 click
    assert_close(ratios[1].value, 1.0);
    assert_close(ratios[2].value, 0.0);
}

#[tokio::test]
async fn test_empty_tag_behaves_like_no_tag() {
    let (service, _td) = seeded_service().await;
    let start = ts("2021-07-20 00:00:00");
    let end = ts("2021-07-21 23:59:59");
    let none = service.ctr_by_site(start, end, None).await.unwrap();
    let empty = service.ctr_by_site(start, end, Some("")).await.unwrap();
    assert_eq!(none, empty);
}

#[tokio::test]
async fn test_ctr_by_site_sorted_by_site_id() {
    let (service, _td) = seeded_service().await;
    let ratios = service
        .ctr_by_site(ts("2021-07-20 00:00:00"), ts("2021-07-21 23:59:59"), None)
        .await
        .unwrap();
    assert_eq!(ratios[0].key, "other.com");
    assert_close(ratios[0].value, 0.5);
    assert_eq!(ratios[1].key, "site.com");
    assert_close(ratios[1].value, 2.0 / 3.0);
}

#[tokio::test]
async fn test_ratio_range_is_inclusive() {
    let (service, _td) = seeded_service().await;
    let instant = ts("2021-07-20 20:00:00");
    let ratios = service.ctr_by_region(instant, instant, None).await.unwrap();
    // 只有 u1，两次 fclick
    assert_eq!(ratios.len(), 1);
    assert_close(ratios[0].value, 2.0);
}

#[tokio::test]
async fn test_ctr_by_interval_is_percent() {
    let (service, _td) = seeded_service().await;
    let ratios = service
        .ctr_by_interval(
            ts("2021-07-20 00:00:00"),
            ts("2021-07-20 23:59:59"),
            Granularity::Hour,
            None,
        )
        .await
        .unwrap();
    assert_eq!(ratios.len(), 2);
    assert_eq!(ratios[0].key, ts("2021-07-20 20:00:00"));
    assert_close(ratios[0].value, 200.0 / 3.0);
    assert_eq!(ratios[1].key, ts("2021-07-20 21:00:00"));
    assert_close(ratios[1].value, 100.0);
}

#[tokio::test]
async fn test_ctr_by_day_buckets() {
    let (service, _td) = seeded_service().await;
    let ratios = service
        .ctr_by_interval(
            ts("2021-07-20 00:00:00"),
            ts("2021-07-21 23:59:59"),
            Granularity::Day,
            None,
        )
        .await
        .unwrap();
    assert_eq!(ratios.len(), 2);
    assert_eq!(ratios[0].key, ts("2021-07-20 00:00:00"));
    // u1 fclick×2 + u3 click / 4 views
    assert_close(ratios[0].value, 75.0);
    assert_eq!(ratios[1].key, ts("2021-07-21 00:00:00"));
    assert_close(ratios[1].value, 0.0);
}

#[tokio::test]
async fn test_minute_buckets_split_views() {
    let (service, _td) = seeded_service().await;
    let ratios = service
        .ctr_by_interval(
            ts("2021-07-20 20:00:00"),
            ts("2021-07-20 20:59:59"),
            Granularity::Minute,
            None,
        )
        .await
        .unwrap();
    let keys: Vec<NaiveDateTime> = ratios.iter().map(|r| r.key).collect();
    assert_eq!(
        keys,
        vec![
            ts("2021-07-20 20:00:00"),
            ts("2021-07-20 20:30:00"),
            ts("2021-07-20 20:45:00"),
        ]
    );
}

// =============================================================================
// EvPM
// =============================================================================

#[tokio::test]
async fn test_evpm_without_tag_counts_every_action() {
    let (service, _td) = seeded_service().await;
    let ratios = service
        .evpm_by_interval(
            ts("2021-07-20 00:00:00"),
            ts("2021-07-20 23:59:59"),
            Granularity::Hour,
            None,
        )
        .await
        .unwrap();
    // 20:00: fclick×2 + vclick + vclick / 3 views
    assert_close(ratios[0].value, 4.0 / 3.0);
    assert_close(ratios[1].value, 1.0);
}

#[tokio::test]
async fn test_evpm_with_tag_matches_plain_and_v_prefixed() {
    let (service, _td) = seeded_service().await;
    let start = ts("2021-07-20 00:00:00");
    let end = ts("2021-07-20 23:59:59");

    let click = service
        .evpm_by_interval(start, end, Granularity::Hour, Some("click"))
        .await
        .unwrap();
    assert_close(click[0].value, 2.0 / 3.0);
    assert_close(click[1].value, 1.0);

    let fclick = service
        .evpm_by_interval(start, end, Granularity::Hour, Some("fclick"))
        .await
        .unwrap();
    assert_close(fclick[0].value, 2.0 / 3.0);
    assert_close(fclick[1].value, 0.0);
}

#[tokio::test]
async fn test_inverted_datetime_range_is_validation_error() {
    let (service, _td) = seeded_service().await;
    let err = service
        .evpm_by_interval(
            ts("2021-07-21 00:00:00"),
            ts("2021-07-20 00:00:00"),
            Granularity::Hour,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StatsError::Validation(_)));
}
