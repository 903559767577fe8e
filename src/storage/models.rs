use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 一次广告展示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub observed_at: NaiveDateTime,
    pub fc_imp_chk: i32,
    pub fc_time_chk: i32,
    pub utmtr: i32,
    /// 营销区域（mmDma）
    pub region: i32,
    pub os_name: String,
    pub model: String,
    pub hardware: String,
    pub site_id: String,
}

/// 聚合后的用户行为：同一 (view_id, tag) 在一次上传中的出现次数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub view_id: String,
    pub tag: String,
    pub count: i32,
}

/// 聚合键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey {
    pub view_id: String,
    pub tag: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}

/// 两张表的行数（`clear_all` 的删除数，或当前总数）
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub views: u64,
    pub actions: u64,
}
