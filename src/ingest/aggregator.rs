//! 行为计数折叠
//!
//! 同一次上传中 (view_id, tag) 相同的行合并为一条 `Action`，
//! `count` 为出现次数。引用未知 view 的行被跳过。

use std::collections::{HashMap, HashSet};

use crate::ingest::parser::ActionRow;
use crate::storage::models::{Action, ActionKey};

#[derive(Debug, Default)]
pub struct ActionAggregator {
    counts: HashMap<ActionKey, i32>,
    /// 首次出现顺序，保证输出稳定
    order: Vec<ActionKey>,
    skipped: usize,
}

impl ActionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 折叠一行；view 不存在时原样返回该行并计入跳过数
    pub fn add(&mut self, row: ActionRow, known_views: &HashSet<String>) -> Option<ActionRow> {
        if !known_views.contains(&row.view_id) {
            self.skipped += 1;
            return Some(row);
        }

        let key = ActionKey {
            view_id: row.view_id,
            tag: row.tag,
        };
        match self.counts.get_mut(&key) {
            Some(count) => *count = count.saturating_add(1),
            None => {
                self.counts.insert(key.clone(), 1);
                self.order.push(key);
            }
        }
        None
    }

    /// 不同 (view_id, tag) 的数量
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_actions(self) -> Vec<Action> {
        let Self { counts, order, .. } = self;
        order
            .into_iter()
            .map(|key| {
                let count = counts.get(&key).copied().unwrap_or(1);
                Action {
                    view_id: key.view_id,
                    tag: key.tag,
                    count,
                }
            })
            .collect()
    }
}
