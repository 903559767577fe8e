//! CSV ingestion
//!
//! - `parser`: 把上传的 CSV 解析为强类型记录（整批校验，失败即拒绝）
//! - `aggregator`: 把行为记录按 (view_id, tag) 折叠为计数

pub mod aggregator;
pub mod parser;

pub use aggregator::ActionAggregator;
pub use parser::{
    ACTION_FIELDS, ActionRecords, ActionRow, OBSERVED_AT_FORMAT, VIEW_FIELDS, ViewRecords,
    action_records, parse_actions, parse_views, view_records,
};

/// 上传文件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum IngestKind {
    Views,
    Actions,
}
