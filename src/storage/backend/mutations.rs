//! Mutation operations for SeaOrmStorage
//!
//! 所有写操作都在单个事务中完成：要么整批可见，要么整批回滚。
//! 写操作不做重试，失败直接交给调用方。

use std::collections::HashMap;

use sea_orm::{EntityTrait, TransactionTrait, sea_query::OnConflict};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{action_to_active_model, view_to_active_model};
use crate::errors::{Result, StatsError};
use crate::storage::models::{Action, RowCounts, View};

use migration::entities::{action, view};

/// 同一批次中 id 重复时只保留最后一次出现，返回保留行的下标（升序）
fn last_occurrence_indices(views: &[View]) -> Vec<usize> {
    let mut latest: HashMap<&str, usize> = HashMap::with_capacity(views.len());
    for (idx, view) in views.iter().enumerate() {
        latest.insert(view.id.as_str(), idx);
    }
    let mut indices: Vec<usize> = latest.into_values().collect();
    indices.sort_unstable();
    indices
}

impl SeaOrmStorage {
    /// 批量 upsert 展示记录
    ///
    /// id 已存在时覆盖全部字段。返回写入的不同 id 数量。
    pub async fn upsert_views(&self, views: &[View]) -> Result<usize> {
        if views.is_empty() {
            return Ok(0);
        }

        let indices = last_occurrence_indices(views);

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StatsError::database_operation(format!("开始事务失败: {}", e)))?;

        for chunk in indices.chunks(self.write_chunk_size) {
            let active_models: Vec<view::ActiveModel> = chunk
                .iter()
                .map(|&idx| view_to_active_model(&views[idx]))
                .collect();

            view::Entity::insert_many(active_models)
                .on_conflict(
                    OnConflict::column(view::Column::Id)
                        .update_columns([
                            view::Column::ObservedAt,
                            view::Column::FcImpChk,
                            view::Column::FcTimeChk,
                            view::Column::Utmtr,
                            view::Column::Region,
                            view::Column::OsName,
                            view::Column::Model,
                            view::Column::Hardware,
                            view::Column::SiteId,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await
                .map_err(|e| {
                    StatsError::database_operation(format!("批量写入展示记录失败: {}", e))
                })?;
        }

        txn.commit()
            .await
            .map_err(|e| StatsError::database_operation(format!("提交事务失败: {}", e)))?;

        info!(
            "Upserted {} views ({} rows in batch)",
            indices.len(),
            views.len()
        );
        Ok(indices.len())
    }

    /// 批量插入聚合后的行为记录，返回插入条数
    pub async fn insert_actions(&self, actions: &[Action]) -> Result<usize> {
        if actions.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StatsError::database_operation(format!("开始事务失败: {}", e)))?;

        for chunk in actions.chunks(self.write_chunk_size) {
            let active_models: Vec<action::ActiveModel> =
                chunk.iter().map(action_to_active_model).collect();

            action::Entity::insert_many(active_models)
                .exec(&txn)
                .await
                .map_err(|e| {
                    StatsError::database_operation(format!("批量写入行为记录失败: {}", e))
                })?;
        }

        txn.commit()
            .await
            .map_err(|e| StatsError::database_operation(format!("提交事务失败: {}", e)))?;

        info!("Inserted {} actions", actions.len());
        Ok(actions.len())
    }

    /// 删除全部行为与展示记录（先删行为，满足外键约束）
    pub async fn clear_all(&self) -> Result<RowCounts> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StatsError::database_operation(format!("开始事务失败: {}", e)))?;

        let actions = action::Entity::delete_many()
            .exec(&txn)
            .await
            .map_err(|e| StatsError::database_operation(format!("删除行为记录失败: {}", e)))?;
        let views = view::Entity::delete_many()
            .exec(&txn)
            .await
            .map_err(|e| StatsError::database_operation(format!("删除展示记录失败: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| StatsError::database_operation(format!("提交事务失败: {}", e)))?;

        let summary = RowCounts {
            views: views.rows_affected,
            actions: actions.rows_affected,
        };
        info!(
            "Cleared {} views and {} actions",
            summary.views, summary.actions
        );
        Ok(summary)
    }
}
