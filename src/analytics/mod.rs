//! 统计查询的领域类型
//!
//! - `granularity`: 时间分桶粒度及各数据库下的分桶表达式
//! - `tag_rule`: CTR / EvPM 的行为标签匹配规则
//! - `ratio`: 查询结果类型

pub mod granularity;
pub mod ratio;
pub mod tag_rule;

pub use granularity::{BUCKET_LABEL_FORMAT, Granularity, day_label_expr, parse_bucket_label};
pub use ratio::{Count, Ratio, RatioScale};
pub use tag_rule::TagRule;
