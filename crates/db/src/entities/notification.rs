//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::follow::FollowTargetType;

/// Notification types.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    /// A followed author or category published a new entry
    #[sea_orm(string_value = "newContent")]
    NewContent,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    #[sea_orm(indexed)]
    pub recipient_id: String,

    /// Notification type
    pub notification_type: NotificationType,

    /// Kind of followed target that triggered the notification
    #[sea_orm(nullable)]
    pub target_type: Option<FollowTargetType>,

    /// UID of the followed author or category
    #[sea_orm(nullable)]
    pub target_entry_id: Option<String>,

    /// UID of the newly published entry
    #[sea_orm(nullable)]
    pub entry_uid: Option<String>,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
