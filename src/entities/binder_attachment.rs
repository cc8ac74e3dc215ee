use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "binder_attachments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub binder_id: Uuid,
    pub title: String,
    /// Storage path of the attached file
    pub file: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::binder::Entity",
        from = "Column::BinderId",
        to = "super::binder::Column::Id",
        on_delete = "Cascade"
    )]
    Binder,
}

impl Related<super::binder::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Binder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
