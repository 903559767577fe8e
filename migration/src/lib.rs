pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20240720_000001_views_table;
mod m20240720_000002_actions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240720_000001_views_table::Migration),
            Box::new(m20240720_000002_actions_table::Migration),
        ]
    }
}
