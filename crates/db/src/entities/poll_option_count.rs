//! Poll option count projection entity.
//!
//! One row per (article, option). Rows are created lazily on an option's
//! first vote and never deleted; `vote_count` is floored at zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll_option_count")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Article carrying the poll
    #[sea_orm(indexed)]
    pub article_uid: String,

    /// Option index (0-based)
    pub option_index: i32,

    /// Denormalized option label
    pub option_text: String,

    /// Denormalized poll question, captured on first vote
    #[sea_orm(nullable)]
    pub poll_question: Option<String>,

    /// Number of current votes for this option
    #[sea_orm(default_value = 0)]
    pub vote_count: i32,

    pub last_updated: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
