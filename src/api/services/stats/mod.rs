//! Stats API
//!
//! CSV 上传与统计查询。所有响应使用 `{code, message, data}` 信封。

pub mod analytics;
pub mod error_code;
pub mod helpers;
pub mod routes;
pub mod types;
pub mod upload;

pub use error_code::ErrorCode;
pub use helpers::{api_result, error_from_stats, query_config};
pub use routes::{actions_routes, data_routes, views_routes};
pub use types::{ApiResponse, IngestSummary};
