//! Follow endpoints (authors and categories).

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{delete, get, post},
};
use newsdesk_common::AppResult;
use newsdesk_core::ToggleTarget;
use newsdesk_db::entities::follow::FollowTargetType;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Follow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub target_type: FollowTargetType,
    pub target_entry_id: String,
}

/// Follow state response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStateResponse {
    pub followed: bool,
}

/// Follower count query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowTargetQuery {
    pub target_type: FollowTargetType,
    pub target_entry_id: String,
}

/// Follower count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerCountResponse {
    pub count: u64,
}

/// Toggle a follow.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowStateResponse>> {
    let target = ToggleTarget::Follow {
        target_type: req.target_type,
        target_entry_id: req.target_entry_id,
    };
    let followed = state.engagement_service.toggle(&user.id, &target).await?;

    Ok(ApiResponse::ok(FollowStateResponse { followed }))
}

/// Explicit unfollow. Fails with 404 when no follow exists.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowStateResponse>> {
    state
        .engagement_service
        .unfollow(&user.id, req.target_type, &req.target_entry_id)
        .await?;

    Ok(ApiResponse::ok(FollowStateResponse { followed: false }))
}

/// Get the follower count for a target.
async fn count(
    State(state): State<AppState>,
    Query(query): Query<FollowTargetQuery>,
) -> ApiResponse<FollowerCountResponse> {
    let count = state
        .engagement_service
        .follower_count(query.target_type, &query.target_entry_id)
        .await;
    ApiResponse::ok(FollowerCountResponse { count })
}

/// Get the follow state for a target (initial UI state).
async fn follow_state(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FollowTargetQuery>,
) -> ApiResponse<FollowStateResponse> {
    let followed = state
        .engagement_service
        .is_following(&user.id, query.target_type, &query.target_entry_id)
        .await;
    ApiResponse::ok(FollowStateResponse { followed })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", delete(unfollow))
        .route("/toggle", post(toggle))
        .route("/count", get(count))
        .route("/state", get(follow_state))
}
