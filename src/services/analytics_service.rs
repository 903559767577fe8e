//! Analytics service layer
//!
//! Turns the raw grouped rows from the storage layer into typed results and
//! applies the ratio arithmetic. Shared between the HTTP API and the CLI.
//!
//! - 计数查询使用日期区间 `[date_from, date_to]`，按整天计算
//! - 比值查询使用时间区间 `[start, end]`，两端都包含
//! - CTR 按时间分桶返回百分比，其余比值返回原始比例

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use crate::analytics::{
    Count, Granularity, Ratio, RatioScale, TagRule, day_label_expr, parse_bucket_label,
};
use crate::errors::{Result, StatsError};
use crate::observer::{NoopObserver, StatsObserver};
use crate::storage::{DimensionFilter, RowCounts, SeaOrmStorage};

/// 支持的日期时间输入格式
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
    observer: Arc<dyn StatsObserver>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self::with_observer(storage, NoopObserver::arc())
    }

    pub fn with_observer(storage: Arc<SeaOrmStorage>, observer: Arc<dyn StatsObserver>) -> Self {
        Self { storage, observer }
    }

    // ============ 参数解析 ============

    /// 解析 `YYYY-MM-DD`
    pub fn parse_date(s: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            StatsError::validation(format!(
                "Invalid date: '{}'. Expected format: YYYY-MM-DD",
                s
            ))
        })
    }

    /// 解析 `YYYY-MM-DD HH:MM:SS`、`YYYY-MM-DDTHH:MM[:SS]`，或只有日期（视为当天 00:00:00）
    pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
        let s = s.trim();
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
            .ok_or_else(|| {
                StatsError::validation(format!(
                    "Invalid datetime: '{}'. Expected format: YYYY-MM-DD HH:MM:SS",
                    s
                ))
            })
    }

    /// 把日期区间转成 `[start, end_exclusive)`
    fn day_bounds(date_from: NaiveDate, date_to: NaiveDate) -> Result<(NaiveDateTime, NaiveDateTime)> {
        if date_from > date_to {
            return Err(StatsError::validation(format!(
                "dateFrom ({}) must not be later than dateTo ({})",
                date_from, date_to
            )));
        }
        let end = date_to
            .succ_opt()
            .ok_or_else(|| StatsError::validation(format!("dateTo out of range: {}", date_to)))?;
        Ok((date_from.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN)))
    }

    fn check_range(start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
        if start > end {
            return Err(StatsError::validation(format!(
                "start ({}) must not be later than end ({})",
                start, end
            )));
        }
        Ok(())
    }

    fn finish(&self, query: &str, rows: usize, started: Instant) {
        let elapsed = started.elapsed().as_secs_f64();
        debug!("Analytics: {} returned {} rows in {:.3}s", query, rows, elapsed);
        self.observer.on_query(query, rows, elapsed);
    }

    // ============ 计数 ============

    /// 某个 region 每天的展示数，只包含有数据的日期，按日期升序
    pub async fn count_by_region(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        region: i32,
    ) -> Result<Vec<u64>> {
        self.count_per_day(
            "count_by_region",
            date_from,
            date_to,
            DimensionFilter::Region(region),
        )
        .await
    }

    /// 某个 site 每天的展示数，只包含有数据的日期，按日期升序
    pub async fn count_by_site(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        site_id: &str,
    ) -> Result<Vec<u64>> {
        self.count_per_day(
            "count_by_site",
            date_from,
            date_to,
            DimensionFilter::Site(site_id.to_string()),
        )
        .await
    }

    async fn count_per_day(
        &self,
        query: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        filter: DimensionFilter,
    ) -> Result<Vec<u64>> {
        let started = Instant::now();
        let (start, end) = Self::day_bounds(date_from, date_to)?;
        info!(
            "Analytics: {} {:?} from {} to {}",
            query, filter, date_from, date_to
        );

        let rows = self
            .storage
            .count_views_per_day(start, end, &filter, day_label_expr(self.storage.db_backend()))
            .await
            .map_err(|e| StatsError::query_failed(format!("{} failed: {}", query, e)))?;

        let counts: Vec<u64> = rows.into_iter().map(|r| r.count.max(0) as u64).collect();
        self.finish(query, counts.len(), started);
        Ok(counts)
    }

    /// 每个 region 的展示总数
    pub async fn views_per_region(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<Count<i32>>> {
        let started = Instant::now();
        let (start, end) = Self::day_bounds(date_from, date_to)?;
        let rows = self
            .storage
            .count_views_by_region(start, end)
            .await
            .map_err(|e| StatsError::query_failed(format!("views_per_region failed: {}", e)))?;

        let counts: Vec<Count<i32>> = rows
            .into_iter()
            .map(|r| Count {
                key: r.dim,
                count: r.count.max(0) as u64,
            })
            .collect();
        self.finish("views_per_region", counts.len(), started);
        Ok(counts)
    }

    /// 每个 site 的展示总数
    pub async fn views_per_site(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<Count<String>>> {
        let started = Instant::now();
        let (start, end) = Self::day_bounds(date_from, date_to)?;
        let rows = self
            .storage
            .count_views_by_site(start, end)
            .await
            .map_err(|e| StatsError::query_failed(format!("views_per_site failed: {}", e)))?;

        let counts: Vec<Count<String>> = rows
            .into_iter()
            .map(|r| Count {
                key: r.dim,
                count: r.count.max(0) as u64,
            })
            .collect();
        self.finish("views_per_site", counts.len(), started);
        Ok(counts)
    }

    // ============ 比值 ============

    /// 按 region 的 CTR（原始比例），按 region 升序
    pub async fn ctr_by_region(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        tag: Option<&str>,
    ) -> Result<Vec<Ratio<i32>>> {
        let started = Instant::now();
        Self::check_range(start, end)?;
        let rule = TagRule::ctr(tag);
        info!(
            "Analytics: ctr_by_region from {} to {}, rule={:?}",
            start, end, rule
        );

        let rows = self
            .storage
            .ratio_by_region(start, end, &rule)
            .await
            .map_err(|e| StatsError::query_failed(format!("ctr_by_region failed: {}", e)))?;

        let ratios: Vec<Ratio<i32>> = rows
            .into_iter()
            .map(|r| Ratio {
                key: r.dim,
                value: RatioScale::Proportion.apply(r.hits, r.view_count),
            })
            .collect();
        self.finish("ctr_by_region", ratios.len(), started);
        Ok(ratios)
    }

    /// 按 site 的 CTR（原始比例），按 site_id 升序
    pub async fn ctr_by_site(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        tag: Option<&str>,
    ) -> Result<Vec<Ratio<String>>> {
        let started = Instant::now();
        Self::check_range(start, end)?;
        let rule = TagRule::ctr(tag);
        info!(
            "Analytics: ctr_by_site from {} to {}, rule={:?}",
            start, end, rule
        );

        let rows = self
            .storage
            .ratio_by_site(start, end, &rule)
            .await
            .map_err(|e| StatsError::query_failed(format!("ctr_by_site failed: {}", e)))?;

        let ratios: Vec<Ratio<String>> = rows
            .into_iter()
            .map(|r| Ratio {
                key: r.dim,
                value: RatioScale::Proportion.apply(r.hits, r.view_count),
            })
            .collect();
        self.finish("ctr_by_site", ratios.len(), started);
        Ok(ratios)
    }

    /// 按时间桶的 CTR（百分比），按桶起点升序
    pub async fn ctr_by_interval(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity: Granularity,
        tag: Option<&str>,
    ) -> Result<Vec<Ratio<NaiveDateTime>>> {
        self.ratio_by_interval(
            "ctr_by_interval",
            start,
            end,
            granularity,
            TagRule::ctr(tag),
            RatioScale::Percent,
        )
        .await
    }

    /// 按时间桶的 EvPM（原始比例），按桶起点升序
    pub async fn evpm_by_interval(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity: Granularity,
        tag: Option<&str>,
    ) -> Result<Vec<Ratio<NaiveDateTime>>> {
        self.ratio_by_interval(
            "evpm_by_interval",
            start,
            end,
            granularity,
            TagRule::evpm(tag),
            RatioScale::Proportion,
        )
        .await
    }

    async fn ratio_by_interval(
        &self,
        query: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity: Granularity,
        rule: TagRule,
        scale: RatioScale,
    ) -> Result<Vec<Ratio<NaiveDateTime>>> {
        let started = Instant::now();
        Self::check_range(start, end)?;
        info!(
            "Analytics: {} from {} to {}, granularity={}, rule={:?}",
            query, start, end, granularity, rule
        );

        let bucket_expr = granularity.bucket_expr(self.storage.db_backend());
        let rows = self
            .storage
            .ratio_by_bucket(start, end, &rule, bucket_expr)
            .await
            .map_err(|e| StatsError::query_failed(format!("{} failed: {}", query, e)))?;

        let ratios = rows
            .into_iter()
            .map(|r| {
                Ok(Ratio {
                    key: parse_bucket_label(&r.dim)?,
                    value: scale.apply(r.hits, r.view_count),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.finish(query, ratios.len(), started);
        Ok(ratios)
    }

    // ============ 汇总 ============

    /// 当前两张表的行数
    pub async fn totals(&self) -> Result<RowCounts> {
        Ok(RowCounts {
            views: self.storage.count_views().await?,
            actions: self.storage.count_actions().await?,
        })
    }
}
