use serde::{Deserialize, Serialize};

/// 比值的刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioScale {
    /// 原始比例
    Proportion,
    /// 百分比（x100）
    Percent,
}

impl RatioScale {
    /// `hits / views`，views 为 0 时返回 0.0
    pub fn apply(self, hits: i64, views: i64) -> f64 {
        if views <= 0 {
            return 0.0;
        }
        let ratio = hits as f64 / views as f64;
        match self {
            RatioScale::Proportion => ratio,
            RatioScale::Percent => ratio * 100.0,
        }
    }
}

/// 按 key 分组的比值（CTR / EvPM）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ratio<K> {
    pub key: K,
    pub value: f64,
}

/// 按 key 分组的计数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count<K> {
    pub key: K,
    pub count: u64,
}
