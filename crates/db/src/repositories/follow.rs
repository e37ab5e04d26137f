//! Follow repository.

use std::sync::Arc;

use crate::entities::{Follow, follow, follow::FollowTargetType};
use newsdesk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow by its identity triple.
    pub async fn find_by_identity(
        &self,
        user_id: &str,
        target_type: FollowTargetType,
        target_entry_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::TargetType.eq(target_type))
            .filter(follow::Column::TargetEntryId.eq(target_entry_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following a target.
    pub async fn is_following(
        &self,
        user_id: &str,
        target_type: FollowTargetType,
        target_entry_id: &str,
    ) -> AppResult<bool> {
        Ok(self
            .find_by_identity(user_id, target_type, target_entry_id)
            .await?
            .is_some())
    }

    /// Create a new follow.
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Follow already exists".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a follow by its identity triple.
    pub async fn delete_by_identity(
        &self,
        user_id: &str,
        target_type: FollowTargetType,
        target_entry_id: &str,
    ) -> AppResult<()> {
        let f = self
            .find_by_identity(user_id, target_type, target_entry_id)
            .await?;
        if let Some(f) = f {
            f.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get the followers of a target (paginated, for batched fan-out).
    pub async fn find_followers(
        &self,
        target_type: FollowTargetType,
        target_entry_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        let mut query = Follow::find()
            .filter(follow::Column::TargetType.eq(target_type))
            .filter(follow::Column::TargetEntryId.eq(target_entry_id))
            .order_by_desc(follow::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count followers of a target.
    pub async fn count_followers(
        &self,
        target_type: FollowTargetType,
        target_entry_id: &str,
    ) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::TargetType.eq(target_type))
            .filter(follow::Column::TargetEntryId.eq(target_entry_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the targets a user is following (paginated).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        let mut query = Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .order_by_desc(follow::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
