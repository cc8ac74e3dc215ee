use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::layout::{LayoutError, ShelfLayout};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shelves")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub code: String,
    #[sea_orm(column_type = "Text")]
    pub desc: String,
    #[sea_orm(nullable)]
    pub cols: Option<i32>,
    #[sea_orm(nullable)]
    pub rows: Option<i32>,
    #[sea_orm(nullable)]
    pub nums: Option<i32>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// The layout the shelf was allocated with.
    pub fn layout(&self) -> Result<ShelfLayout, LayoutError> {
        ShelfLayout::from_dimensions(self.cols, self.rows, self.nums)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::container::Entity")]
    Containers,
    #[sea_orm(has_many = "super::binder::Entity")]
    Binders,
}

impl Related<super::container::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Containers.def()
    }
}

impl Related<super::binder::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Binders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
