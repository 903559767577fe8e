//! 行为记录表迁移
//!
//! actions.view_id 引用 views.id；同一次上传内 (view_id, tag) 唯一，
//! 跨上传不做合并，因此这里不建唯一约束。

use sea_orm_migration::prelude::*;

use super::m20240720_000001_views_table::Views;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Actions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Actions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Actions::ViewId).string_len(255).not_null())
                    .col(ColumnDef::new(Actions::Tag).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Actions::Count)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_actions_view_id")
                            .from(Actions::Table, Actions::ViewId)
                            .to(Views::Table, Views::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_actions_view_id")
                    .table(Actions::Table)
                    .col(Actions::ViewId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_actions_tag")
                    .table(Actions::Table)
                    .col(Actions::Tag)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_actions_tag").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_actions_view_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Actions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Actions {
    #[sea_orm(iden = "actions")]
    Table,
    Id,
    ViewId,
    Tag,
    Count,
}
