//! Poll endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use newsdesk_common::{AppError, AppResult};
use newsdesk_core::{CastVoteInput, PollResults, UserVote};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Most article uids accepted by the batch results endpoint.
const MAX_BATCH_POLLS: usize = 100;

/// Poll results response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResultsResponse {
    pub options: Vec<PollOptionResponse>,
    pub total_votes: i64,
}

/// One option in a poll results response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionResponse {
    pub option_index: i32,
    pub option_text: String,
    pub vote_count: i64,
    pub percentage: i32,
}

/// The viewer's current vote.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVoteResponse {
    pub option_index: i32,
    pub option_text: String,
    pub voted_at: String,
}

impl From<PollResults> for PollResultsResponse {
    fn from(results: PollResults) -> Self {
        Self {
            options: results
                .options
                .into_iter()
                .map(|o| PollOptionResponse {
                    option_index: o.option_index,
                    option_text: o.option_text,
                    vote_count: o.vote_count,
                    percentage: o.percentage,
                })
                .collect(),
            total_votes: results.total_votes,
        }
    }
}

impl From<UserVote> for UserVoteResponse {
    fn from(vote: UserVote) -> Self {
        Self {
            option_index: vote.option_index,
            option_text: vote.option_text,
            voted_at: vote.voted_at.to_rfc3339(),
        }
    }
}

/// Cast vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub article_uid: String,
    pub option_index: i32,
    pub option_text: String,
    pub poll_question: Option<String>,
    pub locale: Option<String>,
}

/// Cast vote response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteResponse {
    pub poll_results: PollResultsResponse,
}

/// Change vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeVoteRequest {
    pub article_uid: String,
    pub option_index: i32,
    pub option_text: String,
}

/// Change vote response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeVoteResponse {
    pub voted_option: UserVoteResponse,
    pub poll_results: PollResultsResponse,
}

/// Poll results query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResultsQuery {
    pub article_uid: String,
}

/// Poll results response with viewer state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResultsWithViewerResponse {
    pub poll_results: PollResultsResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<UserVoteResponse>,
    pub is_authenticated: bool,
}

/// Batch poll results request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPollResultsRequest {
    pub article_uids: Vec<String>,
}

/// Batch poll results response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPollResultsResponse {
    pub poll_results: HashMap<String, PollResultsResponse>,
    pub user_votes: HashMap<String, UserVoteResponse>,
    pub is_authenticated: bool,
}

/// Cast a first vote on a poll.
async fn cast_vote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CastVoteRequest>,
) -> AppResult<ApiResponse<CastVoteResponse>> {
    let results = state
        .poll_service
        .cast_vote(
            &user.id,
            CastVoteInput {
                article_uid: req.article_uid,
                option_index: req.option_index,
                option_text: req.option_text,
                poll_question: req.poll_question,
                locale: req.locale,
            },
        )
        .await?;

    Ok(ApiResponse::ok(CastVoteResponse {
        poll_results: results.into(),
    }))
}

/// Change an existing vote to a different option.
async fn change_vote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChangeVoteRequest>,
) -> AppResult<ApiResponse<ChangeVoteResponse>> {
    let (voted_option, results) = state
        .poll_service
        .change_vote(&user.id, &req.article_uid, req.option_index, &req.option_text)
        .await?;

    Ok(ApiResponse::ok(ChangeVoteResponse {
        voted_option: voted_option.into(),
        poll_results: results.into(),
    }))
}

/// Get a poll's results plus the viewer's vote.
async fn results(
    MaybeAuthUser(maybe_user): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<PollResultsQuery>,
) -> AppResult<ApiResponse<PollResultsWithViewerResponse>> {
    let poll_results = state
        .poll_service
        .get_results_required(&query.article_uid)
        .await?;

    let user_vote = if let Some(ref user) = maybe_user {
        state
            .poll_service
            .find_user_vote(&user.id, &query.article_uid)
            .await?
    } else {
        None
    };

    Ok(ApiResponse::ok(PollResultsWithViewerResponse {
        poll_results: poll_results.into(),
        user_vote: user_vote.map(Into::into),
        is_authenticated: maybe_user.is_some(),
    }))
}

/// Get results for many polls at once (pages render many polls).
async fn results_batch(
    MaybeAuthUser(maybe_user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<BatchPollResultsRequest>,
) -> AppResult<ApiResponse<BatchPollResultsResponse>> {
    if req.article_uids.len() > MAX_BATCH_POLLS {
        return Err(AppError::BadRequest(format!(
            "Too many polls requested (max {MAX_BATCH_POLLS})"
        )));
    }

    let viewer = maybe_user.as_ref().map(|u| u.id.as_str());
    let batch = state
        .poll_service
        .get_results_batch(&req.article_uids, viewer)
        .await?;

    Ok(ApiResponse::ok(BatchPollResultsResponse {
        poll_results: batch
            .results
            .into_iter()
            .map(|(uid, r)| (uid, r.into()))
            .collect(),
        user_votes: batch
            .user_votes
            .into_iter()
            .map(|(uid, v)| (uid, v.into()))
            .collect(),
        is_authenticated: maybe_user.is_some(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vote", post(cast_vote).put(change_vote))
        .route("/results", get(results))
        .route("/results/batch", post(results_batch))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use newsdesk_core::{EngagementService, NotificationService, PollService, UserService};
    use newsdesk_db::repositories::{
        ArticleLikeRepository, FollowRepository, NotificationRepository, PollCountRepository,
        PollVoteRepository, SavedEntryRepository, UserRepository,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn empty_mock() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn test_state() -> AppState {
        AppState {
            user_service: UserService::new(UserRepository::new(empty_mock())),
            engagement_service: EngagementService::new(
                ArticleLikeRepository::new(empty_mock()),
                SavedEntryRepository::new(empty_mock()),
                FollowRepository::new(empty_mock()),
            ),
            poll_service: PollService::new(
                PollVoteRepository::new(empty_mock()),
                PollCountRepository::new(empty_mock()),
            ),
            notification_service: NotificationService::new(
                NotificationRepository::new(empty_mock()),
                FollowRepository::new(empty_mock()),
            ),
            webhook_token: None,
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_vote_is_rejected_before_any_write() {
        let app = router().with_state(test_state());

        let body = serde_json::json!({
            "articleUid": "a1",
            "optionIndex": 0,
            "optionText": "Yes",
        });
        let request = Request::builder()
            .method("POST")
            .uri("/vote")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        // No auth middleware ran, so no user is in extensions; the mock
        // stores would fail loudly if any query were attempted.
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
