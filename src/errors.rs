use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    /// CSV 行字段数与格式不符，整批失败
    MalformedRow {
        line: u64,
        expected: usize,
        actual: usize,
    },
    /// 字段无法解析为整数/时间，整批失败
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },
    CsvParse(String),
    Validation(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    QueryFailed(String),
}

impl StatsError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            StatsError::MalformedRow { .. } => "E001",
            StatsError::InvalidField { .. } => "E002",
            StatsError::CsvParse(_) => "E003",
            StatsError::Validation(_) => "E004",
            StatsError::DatabaseConfig(_) => "E006",
            StatsError::DatabaseConnection(_) => "E007",
            StatsError::DatabaseOperation(_) => "E008",
            StatsError::QueryFailed(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            StatsError::MalformedRow { .. } => "Malformed Row",
            StatsError::InvalidField { .. } => "Invalid Field",
            StatsError::CsvParse(_) => "CSV Parse Error",
            StatsError::Validation(_) => "Validation Error",
            StatsError::DatabaseConfig(_) => "Database Configuration Error",
            StatsError::DatabaseConnection(_) => "Database Connection Error",
            StatsError::DatabaseOperation(_) => "Database Operation Error",
            StatsError::QueryFailed(_) => "Query Failed",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> String {
        match self {
            StatsError::MalformedRow {
                line,
                expected,
                actual,
            } => format!(
                "line {}: the CSV line should exactly match the expected length of {} elements, got {}",
                line, expected, actual
            ),
            StatsError::InvalidField {
                line,
                column,
                value,
                reason,
            } => format!(
                "line {}: cannot parse {} from '{}': {}",
                line, column, value, reason
            ),
            StatsError::CsvParse(msg)
            | StatsError::Validation(msg)
            | StatsError::DatabaseConfig(msg)
            | StatsError::DatabaseConnection(msg)
            | StatsError::DatabaseOperation(msg)
            | StatsError::QueryFailed(msg) => msg.clone(),
        }
    }

    /// 是否为调用方输入错误（上传内容或查询参数有误）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StatsError::MalformedRow { .. }
                | StatsError::InvalidField { .. }
                | StatsError::CsvParse(_)
                | StatsError::Validation(_)
        )
    }

    /// 对应的 HTTP 状态码
    #[cfg(feature = "server")]
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            StatsError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for StatsError {}

// 便捷的构造函数
impl StatsError {
    pub fn malformed_row(line: u64, expected: usize, actual: usize) -> Self {
        StatsError::MalformedRow {
            line,
            expected,
            actual,
        }
    }

    pub fn invalid_field<V: Into<String>, R: ToString>(
        line: u64,
        column: &'static str,
        value: V,
        reason: R,
    ) -> Self {
        StatsError::InvalidField {
            line,
            column,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn csv_parse<T: Into<String>>(msg: T) -> Self {
        StatsError::CsvParse(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        StatsError::Validation(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        StatsError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        StatsError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        StatsError::DatabaseOperation(msg.into())
    }

    pub fn query_failed<T: Into<String>>(msg: T) -> Self {
        StatsError::QueryFailed(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for StatsError {
    fn from(err: sea_orm::DbErr) -> Self {
        StatsError::DatabaseOperation(err.to_string())
    }
}

impl From<csv::Error> for StatsError {
    fn from(err: csv::Error) -> Self {
        StatsError::CsvParse(err.to_string())
    }
}

impl From<chrono::ParseError> for StatsError {
    fn from(err: chrono::ParseError) -> Self {
        StatsError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_row_message_carries_counts() {
        let err = StatsError::malformed_row(3, 10, 9);
        let msg = err.message();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("10 elements"));
        assert!(msg.contains("got 9"));
        assert_eq!(err.code(), "E001");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_invalid_field_message() {
        let err = StatsError::invalid_field(2, "region", "abc", "invalid digit found in string");
        assert_eq!(err.error_type(), "Invalid Field");
        assert!(err.message().contains("region"));
        assert!(err.message().contains("'abc'"));
    }

    #[test]
    fn test_storage_errors_are_not_client_errors() {
        assert!(!StatsError::database_operation("boom").is_client_error());
        assert!(!StatsError::database_connection("down").is_client_error());
        assert!(!StatsError::query_failed("bad sql").is_client_error());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = StatsError::validation("dateFrom is after dateTo");
        assert_eq!(
            err.to_string(),
            "Validation Error: dateFrom is after dateTo"
        );
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_http_status_mapping() {
        use actix_web::http::StatusCode;
        assert_eq!(
            StatsError::malformed_row(2, 2, 3).http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StatsError::database_connection("down").http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            StatsError::database_operation("disk full").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_db_err() {
        let err: StatsError = sea_orm::DbErr::Custom("oops".to_string()).into();
        assert!(matches!(err, StatsError::DatabaseOperation(_)));
    }
}
