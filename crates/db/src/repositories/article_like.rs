//! Article like repository.

use std::sync::Arc;

use crate::entities::{ArticleLike, article_like};
use newsdesk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, SqlErr,
};

/// Article like repository for database operations.
#[derive(Clone)]
pub struct ArticleLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl ArticleLikeRepository {
    /// Create a new article like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by its identity triple.
    pub async fn find_by_identity(
        &self,
        user_id: &str,
        content_type_uid: &str,
        entry_uid: &str,
    ) -> AppResult<Option<article_like::Model>> {
        ArticleLike::find()
            .filter(article_like::Column::UserId.eq(user_id))
            .filter(article_like::Column::ContentTypeUid.eq(content_type_uid))
            .filter(article_like::Column::EntryUid.eq(entry_uid))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked an entry.
    pub async fn is_liked(
        &self,
        user_id: &str,
        content_type_uid: &str,
        entry_uid: &str,
    ) -> AppResult<bool> {
        Ok(self
            .find_by_identity(user_id, content_type_uid, entry_uid)
            .await?
            .is_some())
    }

    /// Create a new like.
    ///
    /// The `(user_id, content_type_uid, entry_uid)` unique index is the
    /// authority on duplicates; a racing insert surfaces as `Conflict`.
    pub async fn create(&self, model: article_like::ActiveModel) -> AppResult<article_like::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Like already exists".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a like by its identity triple.
    pub async fn delete_by_identity(
        &self,
        user_id: &str,
        content_type_uid: &str,
        entry_uid: &str,
    ) -> AppResult<()> {
        let like = self
            .find_by_identity(user_id, content_type_uid, entry_uid)
            .await?;
        if let Some(l) = like {
            l.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Count likes on an entry.
    pub async fn count_by_entry(&self, entry_uid: &str) -> AppResult<u64> {
        ArticleLike::find()
            .filter(article_like::Column::EntryUid.eq(entry_uid))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
