//! Like endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use newsdesk_common::AppResult;
use newsdesk_core::ToggleTarget;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Toggle like request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub content_type_uid: String,
    pub entry_uid: String,
}

/// Toggle like response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeResponse {
    pub liked: bool,
    pub count: u64,
}

/// Like count query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCountQuery {
    pub entry_uid: String,
}

/// Like count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCountResponse {
    pub count: u64,
}

/// Like state query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStateQuery {
    pub content_type_uid: String,
    pub entry_uid: String,
}

/// Like state response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStateResponse {
    pub liked: bool,
}

/// Toggle a like on an entry.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleLikeRequest>,
) -> AppResult<ApiResponse<ToggleLikeResponse>> {
    let target = ToggleTarget::Like {
        content_type_uid: req.content_type_uid,
        entry_uid: req.entry_uid.clone(),
    };
    let liked = state.engagement_service.toggle(&user.id, &target).await?;
    let count = state.engagement_service.like_count(&req.entry_uid).await;

    Ok(ApiResponse::ok(ToggleLikeResponse { liked, count }))
}

/// Get the like count for an entry.
async fn count(
    State(state): State<AppState>,
    Query(query): Query<LikeCountQuery>,
) -> ApiResponse<LikeCountResponse> {
    let count = state.engagement_service.like_count(&query.entry_uid).await;
    ApiResponse::ok(LikeCountResponse { count })
}

/// Get the like state for an entry (initial UI state).
async fn like_state(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LikeStateQuery>,
) -> ApiResponse<LikeStateResponse> {
    let liked = state
        .engagement_service
        .is_liked(&user.id, &query.content_type_uid, &query.entry_uid)
        .await;
    ApiResponse::ok(LikeStateResponse { liked })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/count", get(count))
        .route("/state", get(like_state))
}
