//! Query operations for SeaOrmStorage
//!
//! 只读查询，遇到连接类错误时按 `RetryConfig` 重试。

use std::collections::HashSet;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use super::converters::{model_to_action, model_to_view};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, StatsError};
use crate::storage::models::{Action, View};

use migration::entities::{action, view};

impl SeaOrmStorage {
    pub async fn find_view(&self, id: &str) -> Result<Option<View>> {
        let db = &self.db;
        let id_owned = id.to_string();

        let model = retry::with_retry(&format!("find_view({})", id), self.retry_config, || async {
            view::Entity::find_by_id(id_owned.clone()).one(db).await
        })
        .await
        .map_err(|e| StatsError::database_operation(format!("查询展示记录失败: {}", e)))?;

        Ok(model.map(model_to_view))
    }

    /// 返回 `ids` 中已存在的 view id
    ///
    /// 按写入分块大小拆成多次 `IN (...)` 查询，避免超过数据库的参数上限。
    pub async fn existing_view_ids(&self, ids: &[String]) -> Result<HashSet<String>> {
        let mut found = HashSet::with_capacity(ids.len());
        if ids.is_empty() {
            return Ok(found);
        }

        let db = &self.db;
        for chunk in ids.chunks(self.write_chunk_size) {
            let existing: Vec<String> =
                retry::with_retry("existing_view_ids", self.retry_config, || async {
                    view::Entity::find()
                        .select_only()
                        .column(view::Column::Id)
                        .filter(view::Column::Id.is_in(chunk.iter().cloned()))
                        .into_tuple::<String>()
                        .all(db)
                        .await
                })
                .await
                .map_err(|e| StatsError::database_operation(format!("查询展示记录失败: {}", e)))?;
            found.extend(existing);
        }

        debug!("{} of {} view ids exist", found.len(), ids.len());
        Ok(found)
    }

    pub async fn count_views(&self) -> Result<u64> {
        let db = &self.db;
        retry::with_retry("count_views", self.retry_config, || async {
            view::Entity::find().count(db).await
        })
        .await
        .map_err(|e| StatsError::database_operation(format!("统计展示记录失败: {}", e)))
    }

    pub async fn count_actions(&self) -> Result<u64> {
        let db = &self.db;
        retry::with_retry("count_actions", self.retry_config, || async {
            action::Entity::find().count(db).await
        })
        .await
        .map_err(|e| StatsError::database_operation(format!("统计行为记录失败: {}", e)))
    }

    /// 某个 view 的全部行为记录（按插入顺序）
    pub async fn actions_for_view(&self, view_id: &str) -> Result<Vec<Action>> {
        let db = &self.db;
        let id_owned = view_id.to_string();

        let models = retry::with_retry(
            &format!("actions_for_view({})", view_id),
            self.retry_config,
            || async {
                action::Entity::find()
                    .filter(action::Column::ViewId.eq(id_owned.clone()))
                    .order_by_asc(action::Column::Id)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| StatsError::database_operation(format!("查询行为记录失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_action).collect())
    }
}
