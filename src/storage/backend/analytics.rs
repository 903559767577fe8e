//! Analytics 相关的数据库查询
//!
//! 比值查询统一写成 `views LEFT JOIN actions`：标签规则放在 ON 条件里，
//! 这样没有匹配行为的 view 仍然计入分母。分子为匹配行为的 `count` 之和，
//! 分母为 `COUNT(DISTINCT views.id)`，比值本身由 service 层计算。

use chrono::NaiveDateTime;
use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, sea_query::Expr,
};

use crate::analytics::TagRule;

use migration::entities::view;

// ============ 查询结果类型 ============

/// 按自然日计数
#[derive(Debug, FromQueryResult)]
pub struct DayCountRow {
    pub label: String,
    pub count: i64,
}

/// 按 region 计数
#[derive(Debug, FromQueryResult)]
pub struct RegionCountRow {
    pub dim: i32,
    pub count: i64,
}

/// 按 site_id 计数
#[derive(Debug, FromQueryResult)]
pub struct SiteCountRow {
    pub dim: String,
    pub count: i64,
}

/// 按 region 的分子/分母
#[derive(Debug, FromQueryResult)]
pub struct RegionRatioRow {
    pub dim: i32,
    pub hits: i64,
    pub view_count: i64,
}

/// 按 site_id 的分子/分母
#[derive(Debug, FromQueryResult)]
pub struct SiteRatioRow {
    pub dim: String,
    pub hits: i64,
    pub view_count: i64,
}

/// 按时间桶的分子/分母，`dim` 为桶起点标签
#[derive(Debug, FromQueryResult)]
pub struct BucketRatioRow {
    pub dim: String,
    pub hits: i64,
    pub view_count: i64,
}

/// 计数查询的维度过滤
#[derive(Debug, Clone)]
pub enum DimensionFilter {
    Region(i32),
    Site(String),
}

impl DimensionFilter {
    fn apply(&self, select: Select<view::Entity>) -> Select<view::Entity> {
        match self {
            DimensionFilter::Region(region) => select.filter(view::Column::Region.eq(*region)),
            DimensionFilter::Site(site_id) => {
                select.filter(view::Column::SiteId.eq(site_id.as_str()))
            }
        }
    }
}

fn region_expr() -> Expr {
    Expr::col((view::Entity, view::Column::Region))
}

fn site_expr() -> Expr {
    Expr::col((view::Entity, view::Column::SiteId))
}

// ============ SeaOrmStorage Analytics 方法 ============

impl super::SeaOrmStorage {
    fn hits_expr(&self) -> Expr {
        match self.db_backend() {
            // MySQL 的 SUM 返回 DECIMAL
            DbBackend::MySql => Expr::cust("CAST(COALESCE(SUM(actions.count), 0) AS SIGNED)"),
            _ => Expr::cust("COALESCE(SUM(actions.count), 0)"),
        }
    }

    /// 每个自然日的展示数，`[start, end_exclusive)`，按日期升序，没有数据的日期不出现
    pub async fn count_views_per_day(
        &self,
        start: NaiveDateTime,
        end_exclusive: NaiveDateTime,
        filter: &DimensionFilter,
        day_expr: Expr,
    ) -> anyhow::Result<Vec<DayCountRow>> {
        let select = view::Entity::find()
            .select_only()
            .column_as(day_expr.clone(), "label")
            .column_as(view::Column::Id.count(), "count")
            .filter(view::Column::ObservedAt.gte(start))
            .filter(view::Column::ObservedAt.lt(end_exclusive));

        filter
            .apply(select)
            .group_by(day_expr)
            .order_by_asc(Expr::cust("label"))
            .into_model::<DayCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 每个 region 的展示总数
    pub async fn count_views_by_region(
        &self,
        start: NaiveDateTime,
        end_exclusive: NaiveDateTime,
    ) -> anyhow::Result<Vec<RegionCountRow>> {
        self.count_views_by(region_expr(), start, end_exclusive).await
    }

    /// 每个 site_id 的展示总数
    pub async fn count_views_by_site(
        &self,
        start: NaiveDateTime,
        end_exclusive: NaiveDateTime,
    ) -> anyhow::Result<Vec<SiteCountRow>> {
        self.count_views_by(site_expr(), start, end_exclusive).await
    }

    async fn count_views_by<T>(
        &self,
        dim: Expr,
        start: NaiveDateTime,
        end_exclusive: NaiveDateTime,
    ) -> anyhow::Result<Vec<T>>
    where
        T: FromQueryResult + Send + Sync,
    {
        view::Entity::find()
            .select_only()
            .column_as(dim.clone(), "dim")
            .column_as(view::Column::Id.count(), "count")
            .filter(view::Column::ObservedAt.gte(start))
            .filter(view::Column::ObservedAt.lt(end_exclusive))
            .group_by(dim)
            .order_by_asc(Expr::cust("dim"))
            .into_model::<T>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 按 region 的比值原始数据，`[start, end]`
    pub async fn ratio_by_region(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        rule: &TagRule,
    ) -> anyhow::Result<Vec<RegionRatioRow>> {
        self.ratio_rows(region_expr(), start, end, rule).await
    }

    /// 按 site_id 的比值原始数据，`[start, end]`
    pub async fn ratio_by_site(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        rule: &TagRule,
    ) -> anyhow::Result<Vec<SiteRatioRow>> {
        self.ratio_rows(site_expr(), start, end, rule).await
    }

    /// 按时间桶的比值原始数据，`[start, end]`
    pub async fn ratio_by_bucket(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        rule: &TagRule,
        bucket_expr: Expr,
    ) -> anyhow::Result<Vec<BucketRatioRow>> {
        self.ratio_rows(bucket_expr, start, end, rule).await
    }

    async fn ratio_rows<T>(
        &self,
        dim: Expr,
        start: NaiveDateTime,
        end: NaiveDateTime,
        rule: &TagRule,
    ) -> anyhow::Result<Vec<T>>
    where
        T: FromQueryResult + Send + Sync,
    {
        let mut relation = view::Relation::Action.def();
        if let Some(condition) = rule.join_condition() {
            relation = relation.on_condition(move |_, _| condition.clone());
        }

        view::Entity::find()
            .select_only()
            .column_as(dim.clone(), "dim")
            .column_as(self.hits_expr(), "hits")
            .column_as(Expr::cust("COUNT(DISTINCT views.id)"), "view_count")
            .join(JoinType::LeftJoin, relation)
            .filter(view::Column::ObservedAt.between(start, end))
            .group_by(dim)
            .order_by_asc(Expr::cust("dim"))
            .into_model::<T>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}
