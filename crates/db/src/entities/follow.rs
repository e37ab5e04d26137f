//! Follow entity (users following authors or categories).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of entity is being followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "camelCase")]
pub enum FollowTargetType {
    #[sea_orm(string_value = "author")]
    Author,
    #[sea_orm(string_value = "category")]
    Category,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follow")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The follower
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Kind of target being followed
    pub target_type: FollowTargetType,

    /// CMS entry UID of the followed author or category
    #[sea_orm(indexed)]
    pub target_entry_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
