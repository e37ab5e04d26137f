//! Poll vote ledger and count projection repositories.
//!
//! The ledger (`poll_vote`) is authoritative; the projection
//! (`poll_option_count`) is maintained in the same database transaction as
//! every ledger write, so the per-option counts can never diverge from the
//! ledger at a quiescent point.

use std::sync::Arc;

use crate::entities::{PollOptionCount, PollVote, poll_option_count, poll_vote};
use chrono::Utc;
use newsdesk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// A first vote to record: ledger insert plus projection bump.
#[derive(Debug)]
pub struct NewVote<'a> {
    /// Pre-generated id for the ledger row.
    pub vote_id: &'a str,
    /// Pre-generated id for the projection row, used only if the option has
    /// never been voted before.
    pub count_row_id: &'a str,
    pub user_id: &'a str,
    pub article_uid: &'a str,
    pub option_index: i32,
    pub option_text: &'a str,
    pub poll_question: Option<&'a str>,
    pub locale: Option<&'a str>,
}

/// A vote change to apply: ledger update plus a count move between options.
#[derive(Debug)]
pub struct VoteMove<'a> {
    /// Pre-generated id for the new option's projection row, used only if
    /// that option has never been voted before.
    pub count_row_id: &'a str,
    pub article_uid: &'a str,
    pub old_option: i32,
    pub new_option: i32,
    pub new_option_text: &'a str,
}

/// Poll vote ledger repository.
#[derive(Clone)]
pub struct PollVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl PollVoteRepository {
    /// Create a new poll vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's vote on a poll.
    pub async fn find_by_user_and_article(
        &self,
        user_id: &str,
        article_uid: &str,
    ) -> AppResult<Option<poll_vote::Model>> {
        PollVote::find()
            .filter(poll_vote::Column::UserId.eq(user_id))
            .filter(poll_vote::Column::ArticleUid.eq(article_uid))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user's votes across several polls.
    pub async fn find_by_user_and_articles(
        &self,
        user_id: &str,
        article_uids: &[String],
    ) -> AppResult<Vec<poll_vote::Model>> {
        if article_uids.is_empty() {
            return Ok(Vec::new());
        }
        PollVote::find()
            .filter(poll_vote::Column::UserId.eq(user_id))
            .filter(poll_vote::Column::ArticleUid.is_in(article_uids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has voted on a poll.
    pub async fn has_voted(&self, user_id: &str, article_uid: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_article(user_id, article_uid)
            .await?
            .is_some())
    }

    /// Count distinct voters on a poll (ledger rows are unique per user).
    pub async fn count_voters(&self, article_uid: &str) -> AppResult<u64> {
        PollVote::find()
            .filter(poll_vote::Column::ArticleUid.eq(article_uid))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a first vote: insert the ledger row and bump the option's
    /// projection row, both in one transaction.
    ///
    /// A concurrent first vote by the same user trips the ledger's
    /// `(user_id, article_uid)` unique index and surfaces as `Conflict`.
    pub async fn record_vote(&self, v: NewVote<'_>) -> AppResult<poll_vote::Model> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let vote = poll_vote::ActiveModel {
            id: Set(v.vote_id.to_string()),
            user_id: Set(v.user_id.to_string()),
            article_uid: Set(v.article_uid.to_string()),
            option_index: Set(v.option_index),
            option_text: Set(v.option_text.to_string()),
            locale: Set(v.locale.map(ToString::to_string)),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Vote already exists for this poll".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        increment_option_count(
            &txn,
            v.count_row_id,
            v.article_uid,
            v.option_index,
            v.option_text,
            v.poll_question,
            now,
        )
        .await
        .map_err(|e| partial_update(v.article_uid, &e))?;

        txn.commit()
            .await
            .map_err(|e| partial_update(v.article_uid, &e))?;

        Ok(vote)
    }

    /// Move an existing vote to a new option: update the ledger row in place,
    /// decrement the old option's count (floored at zero) and increment the
    /// new option's count, all in one transaction.
    pub async fn move_vote(
        &self,
        vote: poll_vote::Model,
        m: VoteMove<'_>,
    ) -> AppResult<poll_vote::Model> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: poll_vote::ActiveModel = vote.into();
        active.option_index = Set(m.new_option);
        active.option_text = Set(m.new_option_text.to_string());
        active.updated_at = Set(Some(now));

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| partial_update(m.article_uid, &e))?;

        decrement_option_count(&txn, m.article_uid, m.old_option, now)
            .await
            .map_err(|e| partial_update(m.article_uid, &e))?;

        increment_option_count(
            &txn,
            m.count_row_id,
            m.article_uid,
            m.new_option,
            m.new_option_text,
            None,
            now,
        )
        .await
        .map_err(|e| partial_update(m.article_uid, &e))?;

        txn.commit()
            .await
            .map_err(|e| partial_update(m.article_uid, &e))?;

        Ok(updated)
    }
}

/// Poll count projection repository (read side).
#[derive(Clone)]
pub struct PollCountRepository {
    db: Arc<DatabaseConnection>,
}

impl PollCountRepository {
    /// Create a new poll count repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get all option counts for a poll, ordered by option index.
    pub async fn find_by_article(
        &self,
        article_uid: &str,
    ) -> AppResult<Vec<poll_option_count::Model>> {
        PollOptionCount::find()
            .filter(poll_option_count::Column::ArticleUid.eq(article_uid))
            .order_by_asc(poll_option_count::Column::OptionIndex)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get option counts for several polls in one query.
    pub async fn find_by_articles(
        &self,
        article_uids: &[String],
    ) -> AppResult<Vec<poll_option_count::Model>> {
        if article_uids.is_empty() {
            return Ok(Vec::new());
        }
        PollOptionCount::find()
            .filter(
                poll_option_count::Column::ArticleUid
                    .is_in(article_uids.iter().map(String::as_str)),
            )
            .order_by_asc(poll_option_count::Column::ArticleUid)
            .order_by_asc(poll_option_count::Column::OptionIndex)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn partial_update(article_uid: &str, e: &DbErr) -> AppError {
    AppError::PartialUpdate(format!("vote write for poll {article_uid} did not commit: {e}"))
}

/// Add one to an option's count, creating the row at count 1 if the option
/// has never been voted before.
async fn increment_option_count<C: ConnectionTrait>(
    conn: &C,
    row_id: &str,
    article_uid: &str,
    option_index: i32,
    option_text: &str,
    poll_question: Option<&str>,
    now: DateTimeWithTimeZone,
) -> Result<(), DbErr> {
    let res = PollOptionCount::update_many()
        .col_expr(
            poll_option_count::Column::VoteCount,
            Expr::col(poll_option_count::Column::VoteCount).add(1),
        )
        .col_expr(poll_option_count::Column::LastUpdated, Expr::value(now))
        .filter(poll_option_count::Column::ArticleUid.eq(article_uid))
        .filter(poll_option_count::Column::OptionIndex.eq(option_index))
        .exec(conn)
        .await?;

    if res.rows_affected == 0 {
        poll_option_count::ActiveModel {
            id: Set(row_id.to_string()),
            article_uid: Set(article_uid.to_string()),
            option_index: Set(option_index),
            option_text: Set(option_text.to_string()),
            poll_question: Set(poll_question.map(ToString::to_string)),
            vote_count: Set(1),
            last_updated: Set(now),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Subtract one from an option's count, never going below zero.
async fn decrement_option_count<C: ConnectionTrait>(
    conn: &C,
    article_uid: &str,
    option_index: i32,
    now: DateTimeWithTimeZone,
) -> Result<(), DbErr> {
    PollOptionCount::update_many()
        .col_expr(
            poll_option_count::Column::VoteCount,
            Expr::cust("GREATEST(vote_count - 1, 0)"),
        )
        .col_expr(poll_option_count::Column::LastUpdated, Expr::value(now))
        .filter(poll_option_count::Column::ArticleUid.eq(article_uid))
        .filter(poll_option_count::Column::OptionIndex.eq(option_index))
        .exec(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_vote(id: &str, user_id: &str, article_uid: &str, option: i32) -> poll_vote::Model {
        poll_vote::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            article_uid: article_uid.to_string(),
            option_index: option,
            option_text: "Yes".to_string(),
            locale: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_count(
        id: &str,
        article_uid: &str,
        option: i32,
        count: i32,
    ) -> poll_option_count::Model {
        poll_option_count::Model {
            id: id.to_string(),
            article_uid: article_uid.to_string(),
            option_index: option,
            option_text: format!("Option {option}"),
            poll_question: None,
            vote_count: count,
            last_updated: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_article_found() {
        let vote = create_test_vote("v1", "u1", "a1", 0);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote]])
                .into_connection(),
        );

        let repo = PollVoteRepository::new(db);
        let result = repo.find_by_user_and_article("u1", "a1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().option_index, 0);
    }

    #[tokio::test]
    async fn test_has_voted_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<poll_vote::Model>::new()])
                .into_connection(),
        );

        let repo = PollVoteRepository::new(db);
        let result = repo.has_voted("u1", "a1").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_find_by_user_and_articles_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = PollVoteRepository::new(db);
        let result = repo
            .find_by_user_and_articles("u1", &[])
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_article_ordered() {
        let c0 = create_test_count("c0", "a1", 0, 3);
        let c1 = create_test_count("c1", "a1", 1, 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c0, c1]])
                .into_connection(),
        );

        let repo = PollCountRepository::new(db);
        let result = repo.find_by_article("a1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].vote_count, 3);
        assert_eq!(result[1].vote_count, 1);
    }

    #[tokio::test]
    async fn test_find_by_articles_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = PollCountRepository::new(db);
        let result = repo.find_by_articles(&[]).await.unwrap();

        assert!(result.is_empty());
    }
}
