//! 请求参数与响应类型

use serde::{Deserialize, Serialize};

/// 统一响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// `/views/countByMmDma`
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CountByMmDmaQuery {
    pub date_from: String,
    pub date_to: String,
    pub mm_dma: i32,
}

/// `/views/countBySiteId`
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CountBySiteIdQuery {
    pub date_from: String,
    pub date_to: String,
    pub site_id: String,
}

/// `/views/perMmDma`、`/views/perSiteId`
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub date_from: String,
    pub date_to: String,
}

/// `/views/ctrByMmDma`、`/views/ctrBySiteId`
#[derive(Deserialize, Debug)]
pub struct CtrQuery {
    pub start: String,
    pub end: String,
    pub tag: Option<String>,
}

/// `/views/ctr`、`/views/evpm`
#[derive(Deserialize, Debug)]
pub struct IntervalQuery {
    pub start: String,
    pub end: String,
    /// minute / hour / day，缺省为 hour
    pub interval: Option<String>,
    pub tag: Option<String>,
}

/// 上传结果
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct IngestSummary {
    pub file: String,
    pub count: usize,
}
