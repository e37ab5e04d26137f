//! API integration tests.
//!
//! These tests verify the API endpoints work correctly together, using a
//! mock database behind the real router. No auth middleware runs here, so
//! requests carry no caller identity unless a test injects one.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use newsdesk_api::{middleware::AppState, router as api_router};
use newsdesk_core::{EngagementService, NotificationService, PollService, UserService};
use newsdesk_db::repositories::{
    ArticleLikeRepository, FollowRepository, NotificationRepository, PollCountRepository,
    PollVoteRepository, SavedEntryRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

/// Create a mock database connection with no prepared results.
fn create_mock_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

/// Create test app state with mock databases.
fn create_test_state(webhook_token: Option<&str>) -> AppState {
    AppState {
        user_service: UserService::new(UserRepository::new(create_mock_db())),
        engagement_service: EngagementService::new(
            ArticleLikeRepository::new(create_mock_db()),
            SavedEntryRepository::new(create_mock_db()),
            FollowRepository::new(create_mock_db()),
        ),
        poll_service: PollService::new(
            PollVoteRepository::new(create_mock_db()),
            PollCountRepository::new(create_mock_db()),
        ),
        notification_service: NotificationService::new(
            NotificationRepository::new(create_mock_db()),
            FollowRepository::new(create_mock_db()),
        ),
        webhook_token: webhook_token.map(ToString::to_string),
    }
}

/// Create the test router.
fn create_test_router() -> Router {
    api_router().with_state(create_test_state(None))
}

#[tokio::test]
async fn test_unauthenticated_like_toggle_returns_401() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/likes/toggle")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"contentTypeUid":"article","entryUid":"blt1"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_follow_toggle_returns_401() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/follows/toggle")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"targetType":"author","targetEntryId":"author1"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_like_count_degrades_to_zero_when_store_fails() {
    let app = create_test_router();

    // The mock database errors every query; the count read model must
    // still answer with zero rather than break the page.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/likes/count?entryUid=blt1")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"]["count"], 0);
}

#[tokio::test]
async fn test_poll_results_requires_article_uid() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/polls/results")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Missing query parameter fails query extraction
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_disabled_without_configured_token() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications/content-published")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"targetType":"author","targetEntryId":"author1","entryUid":"blt1"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_webhook_rejects_wrong_token() {
    let app = api_router().with_state(create_test_state(Some("hook-secret")));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications/content-published")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("x-newsdesk-webhook-token", "wrong")
                .body(Body::from(
                    r#"{"targetType":"author","targetEntryId":"author1","entryUid":"blt1"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vote_with_invalid_json_returns_error() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/polls/vote")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    // Rejected before the handler: no identity in extensions
    assert!(
        response.status() == StatusCode::UNAUTHORIZED
            || response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}
