//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::StatsError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 4000-4099: 上传 / CSV 错误
/// - 5000-5099: 数据库错误
/// - 6000-6099: 统计查询错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    InternalServerError = 1005,
    FileTooLarge = 1011,
    InvalidDateFormat = 1012,
    ServiceUnavailable = 1030,

    // 上传 / CSV 错误 4000-4099
    InvalidMultipartData = 4002,
    FileReadError = 4003,
    CsvFileMissing = 4004,
    CsvParseError = 4005,
    MalformedRow = 4006,
    InvalidField = 4007,

    // 数据库错误 5000-5099
    DatabaseError = 5000,

    // 统计查询错误 6000-6099
    AnalyticsQueryFailed = 6000,
    InvalidInterval = 6003,
}

impl From<&StatsError> for ErrorCode {
    fn from(err: &StatsError) -> Self {
        match err {
            StatsError::MalformedRow { .. } => ErrorCode::MalformedRow,
            StatsError::InvalidField { .. } => ErrorCode::InvalidField,
            StatsError::CsvParse(_) => ErrorCode::CsvParseError,
            StatsError::Validation(_) => ErrorCode::BadRequest,
            StatsError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            StatsError::DatabaseConfig(_) | StatsError::DatabaseOperation(_) => {
                ErrorCode::DatabaseError
            }
            StatsError::QueryFailed(_) => ErrorCode::AnalyticsQueryFailed,
        }
    }
}
