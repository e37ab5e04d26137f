//! Engagement toggle service (likes, saves, follows).
//!
//! All three actions share the same presence semantics: a row either exists
//! for the (user, target) identity or it does not, and invoking the action
//! flips that state. Counts are derived from the rows, never kept as a
//! separate mutable counter.

use newsdesk_common::{AppError, AppResult, IdGenerator};
use newsdesk_db::{
    entities::{article_like, follow, follow::FollowTargetType, saved_entry},
    repositories::{ArticleLikeRepository, FollowRepository, SavedEntryRepository},
};
use sea_orm::Set;

/// Identity of the presence record a toggle operates on.
///
/// Likes, saves and follows live in separate tables; the closed enum keeps
/// the dispatch exhaustive at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleTarget {
    Like {
        content_type_uid: String,
        entry_uid: String,
    },
    Save {
        content_type_uid: String,
        entry_uid: String,
    },
    Follow {
        target_type: FollowTargetType,
        target_entry_id: String,
    },
}

/// Engagement service for toggle actions and count read models.
#[derive(Clone)]
pub struct EngagementService {
    like_repo: ArticleLikeRepository,
    save_repo: SavedEntryRepository,
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub const fn new(
        like_repo: ArticleLikeRepository,
        save_repo: SavedEntryRepository,
        follow_repo: FollowRepository,
    ) -> Self {
        Self {
            like_repo,
            save_repo,
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle a presence record and return the new state (`true` = active).
    ///
    /// Two racing toggles can both pass the existence check; the store's
    /// unique index then fails the second insert, which is resolved here as
    /// "already active" so exactly one record remains.
    pub async fn toggle(&self, user_id: &str, target: &ToggleTarget) -> AppResult<bool> {
        match target {
            ToggleTarget::Like {
                content_type_uid,
                entry_uid,
            } => {
                if self
                    .like_repo
                    .find_by_identity(user_id, content_type_uid, entry_uid)
                    .await?
                    .is_some()
                {
                    self.like_repo
                        .delete_by_identity(user_id, content_type_uid, entry_uid)
                        .await?;
                    return Ok(false);
                }

                let model = article_like::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    content_type_uid: Set(content_type_uid.clone()),
                    entry_uid: Set(entry_uid.clone()),
                    created_at: Set(chrono::Utc::now().into()),
                };
                self.resolve_insert(self.like_repo.create(model).await.map(|_| ()))
            }
            ToggleTarget::Save {
                content_type_uid,
                entry_uid,
            } => {
                if self
                    .save_repo
                    .find_by_identity(user_id, content_type_uid, entry_uid)
                    .await?
                    .is_some()
                {
                    self.save_repo
                        .delete_by_identity(user_id, content_type_uid, entry_uid)
                        .await?;
                    return Ok(false);
                }

                let model = saved_entry::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    content_type_uid: Set(content_type_uid.clone()),
                    entry_uid: Set(entry_uid.clone()),
                    created_at: Set(chrono::Utc::now().into()),
                };
                self.resolve_insert(self.save_repo.create(model).await.map(|_| ()))
            }
            ToggleTarget::Follow {
                target_type,
                target_entry_id,
            } => {
                if self
                    .follow_repo
                    .find_by_identity(user_id, *target_type, target_entry_id)
                    .await?
                    .is_some()
                {
                    self.follow_repo
                        .delete_by_identity(user_id, *target_type, target_entry_id)
                        .await?;
                    return Ok(false);
                }

                let model = follow::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    target_type: Set(*target_type),
                    target_entry_id: Set(target_entry_id.clone()),
                    created_at: Set(chrono::Utc::now().into()),
                };
                self.resolve_insert(self.follow_repo.create(model).await.map(|_| ()))
            }
        }
    }

    /// Explicit unfollow, for the DELETE boundary variant.
    pub async fn unfollow(
        &self,
        user_id: &str,
        target_type: FollowTargetType,
        target_entry_id: &str,
    ) -> AppResult<()> {
        if !self
            .follow_repo
            .is_following(user_id, target_type, target_entry_id)
            .await?
        {
            return Err(AppError::NotFound("Follow not found".to_string()));
        }
        self.follow_repo
            .delete_by_identity(user_id, target_type, target_entry_id)
            .await
    }

    /// Map an insert outcome to the toggle result. A unique-index conflict
    /// means a racing toggle already inserted the record: the state is
    /// active either way, and exactly one row exists.
    fn resolve_insert(&self, result: AppResult<()>) -> AppResult<bool> {
        match result {
            Ok(()) => Ok(true),
            Err(AppError::Conflict(msg)) => {
                tracing::debug!(reason = %msg, "Toggle insert raced an existing record");
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    // ==================== Count read models ====================
    //
    // Presentation-only reads: a broken store must not break the page, so
    // failures degrade to zero/false with a warning. Write paths above never
    // do this.

    /// Count likes on an entry.
    pub async fn like_count(&self, entry_uid: &str) -> u64 {
        match self.like_repo.count_by_entry(entry_uid).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, entry_uid, "Like count read failed, returning 0");
                0
            }
        }
    }

    /// Count followers of a target.
    pub async fn follower_count(
        &self,
        target_type: FollowTargetType,
        target_entry_id: &str,
    ) -> u64 {
        match self
            .follow_repo
            .count_followers(target_type, target_entry_id)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, target_entry_id, "Follower count read failed, returning 0");
                0
            }
        }
    }

    /// Check if a user has liked an entry.
    pub async fn is_liked(&self, user_id: &str, content_type_uid: &str, entry_uid: &str) -> bool {
        self.like_repo
            .is_liked(user_id, content_type_uid, entry_uid)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, entry_uid, "Like state read failed, returning false");
                false
            })
    }

    /// Check if a user has saved an entry (initial UI state).
    pub async fn is_saved(&self, user_id: &str, content_type_uid: &str, entry_uid: &str) -> bool {
        self.save_repo
            .is_saved(user_id, content_type_uid, entry_uid)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, entry_uid, "Save state read failed, returning false");
                false
            })
    }

    /// Get a user's reading list page plus their total saved count.
    pub async fn saved_entries(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<(Vec<saved_entry::Model>, u64)> {
        let entries = self.save_repo.find_by_user(user_id, limit, until_id).await?;
        let total = self.save_repo.count_by_user(user_id).await?;
        Ok((entries, total))
    }

    /// Check if a user is following a target.
    pub async fn is_following(
        &self,
        user_id: &str,
        target_type: FollowTargetType,
        target_entry_id: &str,
    ) -> bool {
        self.follow_repo
            .is_following(user_id, target_type, target_entry_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, target_entry_id, "Follow state read failed, returning false");
                false
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_like(id: &str, user_id: &str, entry_uid: &str) -> article_like::Model {
        article_like::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content_type_uid: "article".to_string(),
            entry_uid: entry_uid.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn empty_mock() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service_with_like_db(db: Arc<sea_orm::DatabaseConnection>) -> EngagementService {
        EngagementService::new(
            ArticleLikeRepository::new(db),
            SavedEntryRepository::new(empty_mock()),
            FollowRepository::new(empty_mock()),
        )
    }

    #[tokio::test]
    async fn test_toggle_like_off_when_present() {
        let like = create_test_like("l1", "u1", "blt1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like.clone()], [like]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with_like_db(db);
        let target = ToggleTarget::Like {
            content_type_uid: "article".to_string(),
            entry_uid: "blt1".to_string(),
        };

        let active = service.toggle("u1", &target).await.unwrap();
        assert!(!active);
    }

    #[tokio::test]
    async fn test_resolve_insert_recovers_from_conflict() {
        let service = service_with_like_db(empty_mock());

        let resolved = service
            .resolve_insert(Err(AppError::Conflict("Like already exists".to_string())))
            .unwrap();
        assert!(resolved);

        let propagated =
            service.resolve_insert(Err(AppError::Database("connection lost".to_string())));
        assert!(propagated.is_err());
    }

    #[tokio::test]
    async fn test_like_count_defaults_to_zero_on_store_failure() {
        // A mock with no prepared results fails the count query
        let service = service_with_like_db(empty_mock());
        assert_eq!(service.like_count("blt1").await, 0);
    }

    #[tokio::test]
    async fn test_unfollow_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );
        let service = EngagementService::new(
            ArticleLikeRepository::new(empty_mock()),
            SavedEntryRepository::new(empty_mock()),
            FollowRepository::new(db),
        );

        let result = service
            .unfollow("u1", FollowTargetType::Author, "author1")
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
