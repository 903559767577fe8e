//! View entity: one row per unique visitor event id

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "views")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub observed_at: DateTime,
    pub fc_imp_chk: i32,
    pub fc_time_chk: i32,
    pub utmtr: i32,
    /// mmDma geographic market code
    pub region: i32,
    pub os_name: String,
    pub model: String,
    pub hardware: String,
    pub site_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::action::Entity")]
    Action,
}

impl Related<super::action::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Action.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
