//! 浏览记录表迁移
//!
//! 创建 views 表，主键为访客事件 id，并为以下查询维度建立索引：
//! - region（mmDma 分组）
//! - site_id（站点分组）
//! - observed_at（时间范围与分桶）

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Views::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Views::Id)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Views::ObservedAt).date_time().not_null())
                    .col(ColumnDef::new(Views::FcImpChk).integer().not_null())
                    .col(ColumnDef::new(Views::FcTimeChk).integer().not_null())
                    .col(ColumnDef::new(Views::Utmtr).integer().not_null())
                    .col(ColumnDef::new(Views::Region).integer().not_null())
                    .col(ColumnDef::new(Views::OsName).string_len(255).not_null())
                    .col(ColumnDef::new(Views::Model).string_len(255).not_null())
                    .col(ColumnDef::new(Views::Hardware).string_len(255).not_null())
                    .col(ColumnDef::new(Views::SiteId).string_len(255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_views_region")
                    .table(Views::Table)
                    .col(Views::Region)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_views_site_id")
                    .table(Views::Table)
                    .col(Views::SiteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_views_observed_at")
                    .table(Views::Table)
                    .col(Views::ObservedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_views_observed_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_views_site_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_views_region").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Views::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Views {
    #[sea_orm(iden = "views")]
    Table,
    Id,
    ObservedAt,
    FcImpChk,
    FcTimeChk,
    Utmtr,
    Region,
    OsName,
    Model,
    Hardware,
    SiteId,
}
