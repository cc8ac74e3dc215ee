use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One storage slot of a shelf; rows are only ever written by the allocator
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "containers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shelf_id: Uuid,
    pub position: i32,
    #[sea_orm(nullable)]
    pub col: Option<i32>,
    #[sea_orm(nullable)]
    pub row: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shelf::Entity",
        from = "Column::ShelfId",
        to = "super::shelf::Column::Id",
        on_delete = "Cascade"
    )]
    Shelf,
}

impl Related<super::shelf::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shelf.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
