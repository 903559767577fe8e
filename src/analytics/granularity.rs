use chrono::NaiveDateTime;
use sea_orm::{DbBackend, sea_query::Expr};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StatsError};

/// 分桶标签格式：所有数据库都输出桶起点的 `YYYY-MM-DD HH:MM:SS`
pub const BUCKET_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 时间分桶粒度
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::AsRefStr,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Granularity {
    Minute,
    #[default]
    Hour,
    Day,
}

impl Granularity {
    /// 把 `views.observed_at` 截断到桶起点并格式化为 `BUCKET_LABEL_FORMAT`
    pub fn bucket_expr(self, backend: DbBackend) -> Expr {
        let (sqlite_fmt, mysql_fmt, pg_unit) = match self {
            Granularity::Minute => ("%Y-%m-%d %H:%M:00", "%Y-%m-%d %H:%i:00", "minute"),
            Granularity::Hour => ("%Y-%m-%d %H:00:00", "%Y-%m-%d %H:00:00", "hour"),
            Granularity::Day => ("%Y-%m-%d 00:00:00", "%Y-%m-%d 00:00:00", "day"),
        };

        match backend {
            DbBackend::Sqlite => {
                Expr::cust(format!("strftime('{}', views.observed_at)", sqlite_fmt))
            }
            DbBackend::MySql => {
                Expr::cust(format!("DATE_FORMAT(views.observed_at, '{}')", mysql_fmt))
            }
            DbBackend::Postgres | _ => Expr::cust(format!(
                "TO_CHAR(DATE_TRUNC('{}', views.observed_at), 'YYYY-MM-DD HH24:MI:SS')",
                pg_unit
            )),
        }
    }
}

/// 按自然日分组的标签表达式（`YYYY-MM-DD`）
pub fn day_label_expr(backend: DbBackend) -> Expr {
    match backend {
        DbBackend::Sqlite => Expr::cust("strftime('%Y-%m-%d', views.observed_at)"),
        DbBackend::MySql => Expr::cust("DATE_FORMAT(views.observed_at, '%Y-%m-%d')"),
        DbBackend::Postgres | _ => Expr::cust("TO_CHAR(views.observed_at, 'YYYY-MM-DD')"),
    }
}

pub fn parse_bucket_label(label: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(label, BUCKET_LABEL_FORMAT).map_err(|e| {
        StatsError::query_failed(format!("unexpected bucket label '{}': {}", label, e))
    })
}
