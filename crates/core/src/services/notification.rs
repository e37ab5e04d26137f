//! Notification service.
//!
//! Owns the publish fan-out: when a followed author or category publishes a
//! new entry, every follower gets a notification row.

use newsdesk_common::{AppError, AppResult, IdGenerator};
use newsdesk_db::{
    entities::{
        follow::FollowTargetType,
        notification::{self, NotificationType},
    },
    repositories::{FollowRepository, NotificationRepository},
};
use sea_orm::Set;

/// Followers are read and inserted in pages of this size.
const FAN_OUT_BATCH: u64 = 500;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        follow_repo: FollowRepository,
    ) -> Self {
        Self {
            notification_repo,
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Fan out a new-content notification to every follower of the target.
    ///
    /// Returns the number of notified users. Followers are paged so a large
    /// audience never loads into memory at once.
    pub async fn content_published(
        &self,
        target_type: FollowTargetType,
        target_entry_id: &str,
        entry_uid: &str,
    ) -> AppResult<u64> {
        let mut notified = 0u64;
        let mut until_id: Option<String> = None;

        loop {
            let followers = self
                .follow_repo
                .find_followers(target_type, target_entry_id, FAN_OUT_BATCH, until_id.as_deref())
                .await?;
            if followers.is_empty() {
                break;
            }
            until_id = followers.last().map(|f| f.id.clone());
            let page_len = followers.len() as u64;

            let models: Vec<notification::ActiveModel> = followers
                .into_iter()
                .map(|f| notification::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    recipient_id: Set(f.user_id),
                    notification_type: Set(NotificationType::NewContent),
                    target_type: Set(Some(target_type)),
                    target_entry_id: Set(Some(target_entry_id.to_string())),
                    entry_uid: Set(Some(entry_uid.to_string())),
                    is_read: Set(false),
                    created_at: Set(chrono::Utc::now().into()),
                })
                .collect();

            notified += self.notification_repo.create_many(models).await?;

            if page_len < FAN_OUT_BATCH {
                break;
            }
        }

        tracing::info!(
            target_entry_id,
            entry_uid,
            notified,
            "Fanned out new-content notifications"
        );
        Ok(notified)
    }

    /// Get a user's notifications (paginated).
    pub async fn get_notifications(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_user(user_id, limit, until_id, unread_only)
            .await
    }

    /// Count a user's unread notifications.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_read(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> AppResult<notification::Model> {
        let n = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if n.recipient_id != user_id {
            return Err(AppError::Forbidden(
                "Notification belongs to another user".to_string(),
            ));
        }

        self.notification_repo.mark_read(n).await
    }

    /// Mark all of the user's notifications as read.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_read(user_id).await
    }
}
