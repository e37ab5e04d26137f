//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `newsdesk_test`)
//!   `TEST_DB_PASSWORD` (default: `newsdesk_test`)
//!   `TEST_DB_NAME` (default: `newsdesk_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use newsdesk_db::entities::{article_like, follow::FollowTargetType, notification, user};
use newsdesk_db::repositories::{
    ArticleLikeRepository, FollowRepository, NewVote, NotificationRepository, PollCountRepository,
    PollVoteRepository, VoteMove,
};
use newsdesk_db::test_utils::TestDatabase;
use sea_orm::{Database, DatabaseConnection, Set};

async fn setup() -> (TestDatabase, Arc<DatabaseConnection>) {
    let db = TestDatabase::create_unique().await.unwrap();
    newsdesk_db::migrate(db.connection()).await.unwrap();
    let conn = Arc::new(Database::connect(db.config.database_url()).await.unwrap());
    (db, conn)
}

async fn seed_user(conn: &Arc<DatabaseConnection>, id: &str) {
    let repo = newsdesk_db::repositories::UserRepository::new(Arc::clone(conn));
    repo.create(user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(format!("user_{id}")),
        display_name: Set(None),
        avatar_url: Set(None),
        token: Set(Some(format!("token_{id}"))),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    })
    .await
    .unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_double_toggle_leaves_no_row() {
    let (db, conn) = setup().await;
    seed_user(&conn, "u1").await;

    let repo = ArticleLikeRepository::new(Arc::clone(&conn));

    // Toggle on
    repo.create(article_like::ActiveModel {
        id: Set("l1".to_string()),
        user_id: Set("u1".to_string()),
        content_type_uid: Set("article".to_string()),
        entry_uid: Set("blt1".to_string()),
        created_at: Set(Utc::now().into()),
    })
    .await
    .unwrap();
    assert!(repo.is_liked("u1", "article", "blt1").await.unwrap());
    assert_eq!(repo.count_by_entry("blt1").await.unwrap(), 1);

    // Toggle off
    repo.delete_by_identity("u1", "article", "blt1")
        .await
        .unwrap();
    assert!(!repo.is_liked("u1", "article", "blt1").await.unwrap());
    assert_eq!(repo.count_by_entry("blt1").await.unwrap(), 0);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_like_hits_unique_index() {
    let (db, conn) = setup().await;
    seed_user(&conn, "u1").await;

    let repo = ArticleLikeRepository::new(Arc::clone(&conn));
    let model = |id: &str| article_like::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set("u1".to_string()),
        content_type_uid: Set("article".to_string()),
        entry_uid: Set("blt1".to_string()),
        created_at: Set(Utc::now().into()),
    };

    repo.create(model("l1")).await.unwrap();
    let second = repo.create(model("l2")).await;
    assert!(matches!(
        second,
        Err(newsdesk_common::AppError::Conflict(_))
    ));
    assert_eq!(repo.count_by_entry("blt1").await.unwrap(), 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_vote_change_conserves_total() {
    let (db, conn) = setup().await;
    seed_user(&conn, "u1").await;
    seed_user(&conn, "u2").await;

    let votes = PollVoteRepository::new(Arc::clone(&conn));
    let counts = PollCountRepository::new(Arc::clone(&conn));

    votes
        .record_vote(NewVote {
            vote_id: "v1",
            count_row_id: "c1",
            user_id: "u1",
            article_uid: "a1",
            option_index: 0,
            option_text: "Yes",
            poll_question: Some("Agree?"),
            locale: None,
        })
        .await
        .unwrap();
    votes
        .record_vote(NewVote {
            vote_id: "v2",
            count_row_id: "c2",
            user_id: "u2",
            article_uid: "a1",
            option_index: 0,
            option_text: "Yes",
            poll_question: Some("Agree?"),
            locale: None,
        })
        .await
        .unwrap();

    let before = counts.find_by_article("a1").await.unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].vote_count, 2);

    // u1 moves from option 0 to option 1
    let vote = votes
        .find_by_user_and_article("u1", "a1")
        .await
        .unwrap()
        .unwrap();
    votes
        .move_vote(
            vote,
            VoteMove {
                count_row_id: "c3",
                article_uid: "a1",
                old_option: 0,
                new_option: 1,
                new_option_text: "No",
            },
        )
        .await
        .unwrap();

    let after = counts.find_by_article("a1").await.unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].vote_count, 1);
    assert_eq!(after[1].vote_count, 1);
    let total: i32 = after.iter().map(|c| c.vote_count).sum();
    assert_eq!(total, 2);

    // Exactly one ledger row per user, mutated in place
    assert_eq!(votes.count_voters("a1").await.unwrap(), 2);
    let moved = votes
        .find_by_user_and_article("u1", "a1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.option_index, 1);
    assert!(moved.updated_at.is_some());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_vote_is_conflict() {
    let (db, conn) = setup().await;
    seed_user(&conn, "u1").await;

    let votes = PollVoteRepository::new(Arc::clone(&conn));
    let new_vote = |vote_id: &'static str, count_row_id: &'static str| NewVote {
        vote_id,
        count_row_id,
        user_id: "u1",
        article_uid: "a1",
        option_index: 0,
        option_text: "Yes",
        poll_question: None,
        locale: None,
    };

    votes.record_vote(new_vote("v1", "c1")).await.unwrap();
    let second = votes.record_vote(new_vote("v2", "c2")).await;
    assert!(matches!(
        second,
        Err(newsdesk_common::AppError::Conflict(_))
    ));

    // The failed transaction must not have bumped the projection
    let counts = PollCountRepository::new(Arc::clone(&conn));
    let rows = counts.find_by_article("a1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].vote_count, 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_fan_out_inserts_one_row_per_follower() {
    let (db, conn) = setup().await;
    for id in ["u1", "u2", "u3"] {
        seed_user(&conn, id).await;
    }

    let follows = FollowRepository::new(Arc::clone(&conn));
    for (id, user_id) in [("f1", "u1"), ("f2", "u2")] {
        follows
            .create(newsdesk_db::entities::follow::ActiveModel {
                id: Set(id.to_string()),
                user_id: Set(user_id.to_string()),
                target_type: Set(FollowTargetType::Author),
                target_entry_id: Set("author1".to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }

    let notifications = NotificationRepository::new(Arc::clone(&conn));
    let followers = follows
        .find_followers(FollowTargetType::Author, "author1", 500, None)
        .await
        .unwrap();
    let models: Vec<notification::ActiveModel> = followers
        .iter()
        .enumerate()
        .map(|(i, f)| notification::ActiveModel {
            id: Set(format!("n{i}")),
            recipient_id: Set(f.user_id.clone()),
            notification_type: Set(notification::NotificationType::NewContent),
            target_type: Set(Some(FollowTargetType::Author)),
            target_entry_id: Set(Some("author1".to_string())),
            entry_uid: Set(Some("blt_new".to_string())),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        })
        .collect();

    let inserted = notifications.create_many(models).await.unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(notifications.count_unread("u1").await.unwrap(), 1);
    assert_eq!(notifications.count_unread("u2").await.unwrap(), 1);
    assert_eq!(notifications.count_unread("u3").await.unwrap(), 0);

    db.drop_database().await.unwrap();
}
