//! Saved entry (reading list) endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use newsdesk_common::AppResult;
use newsdesk_core::ToggleTarget;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Toggle save request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSaveRequest {
    pub content_type_uid: String,
    pub entry_uid: String,
}

/// Toggle save response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSaveResponse {
    pub saved: bool,
}

/// Save state query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStateQuery {
    pub content_type_uid: String,
    pub entry_uid: String,
}

/// List saved entries request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSavesRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// One saved entry in a list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEntryResponse {
    pub id: String,
    pub content_type_uid: String,
    pub entry_uid: String,
    pub created_at: String,
}

/// List saves response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSavesResponse {
    pub saved_entries: Vec<SavedEntryResponse>,
    pub total: u64,
}

/// Toggle a saved entry.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleSaveRequest>,
) -> AppResult<ApiResponse<ToggleSaveResponse>> {
    let target = ToggleTarget::Save {
        content_type_uid: req.content_type_uid,
        entry_uid: req.entry_uid,
    };
    let saved = state.engagement_service.toggle(&user.id, &target).await?;

    Ok(ApiResponse::ok(ToggleSaveResponse { saved }))
}

/// Get the save state for an entry (initial UI state).
async fn save_state(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SaveStateQuery>,
) -> ApiResponse<ToggleSaveResponse> {
    let saved = state
        .engagement_service
        .is_saved(&user.id, &query.content_type_uid, &query.entry_uid)
        .await;
    ApiResponse::ok(ToggleSaveResponse { saved })
}

/// List the caller's saved entries (reading list).
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListSavesRequest>,
) -> AppResult<ApiResponse<ListSavesResponse>> {
    let limit = req.limit.min(100);
    let (saved_entries, total) = state
        .engagement_service
        .saved_entries(&user.id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(ListSavesResponse {
        saved_entries: saved_entries
            .into_iter()
            .map(|s| SavedEntryResponse {
                id: s.id,
                content_type_uid: s.content_type_uid,
                entry_uid: s.entry_uid,
                created_at: s.created_at.to_rfc3339(),
            })
            .collect(),
        total,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/state", get(save_state))
        .route("/list", post(list))
}
