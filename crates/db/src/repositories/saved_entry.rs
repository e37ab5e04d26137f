//! Saved entry repository.

use std::sync::Arc;

use crate::entities::{SavedEntry, saved_entry};
use newsdesk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};

/// Saved entry repository for database operations.
#[derive(Clone)]
pub struct SavedEntryRepository {
    db: Arc<DatabaseConnection>,
}

impl SavedEntryRepository {
    /// Create a new saved entry repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a saved entry by its identity triple.
    pub async fn find_by_identity(
        &self,
        user_id: &str,
        content_type_uid: &str,
        entry_uid: &str,
    ) -> AppResult<Option<saved_entry::Model>> {
        SavedEntry::find()
            .filter(saved_entry::Column::UserId.eq(user_id))
            .filter(saved_entry::Column::ContentTypeUid.eq(content_type_uid))
            .filter(saved_entry::Column::EntryUid.eq(entry_uid))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has saved an entry.
    pub async fn is_saved(
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

    /// Create a new saved entry.
    pub async fn create(&self, model: saved_entry::ActiveModel) -> AppResult<saved_entry::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Entry already saved".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a saved entry by its identity triple.
    pub async fn delete_by_identity(
        &self,
        user_id: &str,
        content_type_uid: &str,
        entry_uid: &str,
    ) -> AppResult<()> {
        let saved = self
            .find_by_identity(user_id, content_type_uid, entry_uid)
            .await?;
        if let Some(s) = saved {
            s.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get a user's saved entries (paginated, newest first).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<saved_entry::Model>> {
        let mut query = SavedEntry::find()
            .filter(saved_entry::Column::UserId.eq(user_id))
            .order_by_desc(saved_entry::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(saved_entry::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's saved entries.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        SavedEntry::find()
            .filter(saved_entry::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_save(id: &str, user_id: &str, entry_uid: &str) -> saved_entry::Model {
        saved_entry::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content_type_uid: "article".to_string(),
            entry_uid: entry_uid.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_saved_true() {
        let save = create_test_save("s1", "u1", "blt1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[save]])
                .into_connection(),
        );

        let repo = SavedEntryRepository::new(db);
        let result = repo.is_saved("u1", "article", "blt1").await.unwrap();

        assert!(result);
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let s1 = create_test_save("s1", "u1", "blt1");
        let s2 = create_test_save("s2", "u1", "blt2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[s1, s2]])
                .into_connection(),
        );

        let repo = SavedEntryRepository::new(db);
        let result = repo.find_by_user("u1", 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
