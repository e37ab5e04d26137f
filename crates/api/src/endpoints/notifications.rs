//! Notification endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use newsdesk_common::{AppError, AppResult};
use newsdesk_db::entities::{follow::FollowTargetType, notification};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Header the CMS webhook presents its shared token in.
const WEBHOOK_TOKEN_HEADER: &str = "x-newsdesk-webhook-token";

/// Content published webhook request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPublishedRequest {
    pub target_type: FollowTargetType,
    pub target_entry_id: String,
    pub entry_uid: String,
}

/// Content published webhook response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPublishedResponse {
    pub notified: u64,
}

/// List notifications request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
    /// Only unread notifications
    #[serde(default)]
    pub unread_only: bool,
    /// Include unread count in the response
    #[serde(default)]
    pub with_unread_count: bool,
}

const fn default_limit() -> u64 {
    20
}

/// One notification in a list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub notification_type: notification::NotificationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<FollowTargetType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_uid: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            notification_type: n.notification_type,
            target_type: n.target_type,
            target_entry_id: n.target_entry_id,
            entry_uid: n.entry_uid,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// List notifications response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsResponse {
    pub notifications: Vec<NotificationResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<u64>,
}

/// Mark read request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub notification_id: String,
}

/// Mark all read response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// CMS publish webhook: fan out notifications to the target's followers.
///
/// Guarded by the configured shared token rather than user auth; the caller
/// is the CMS, not a browser session.
async fn content_published(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ContentPublishedRequest>,
) -> AppResult<ApiResponse<ContentPublishedResponse>> {
    let Some(expected) = state.webhook_token.as_deref() else {
        return Err(AppError::Forbidden(
            "Webhook endpoint is not configured".to_string(),
        ));
    };
    let presented = headers
        .get(WEBHOOK_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented != Some(expected) {
        return Err(AppError::Unauthorized);
    }

    let notified = state
        .notification_service
        .content_published(req.target_type, &req.target_entry_id, &req.entry_uid)
        .await?;

    Ok(ApiResponse::ok(ContentPublishedResponse { notified }))
}

/// List the caller's notifications.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListNotificationsRequest>,
) -> AppResult<ApiResponse<ListNotificationsResponse>> {
    let limit = req.limit.min(100);
    let notifications = state
        .notification_service
        .get_notifications(&user.id, limit, req.until_id.as_deref(), req.unread_only)
        .await?;

    let unread_count = if req.with_unread_count {
        Some(state.notification_service.count_unread(&user.id).await?)
    } else {
        None
    };

    Ok(ApiResponse::ok(ListNotificationsResponse {
        notifications: notifications.into_iter().map(Into::into).collect(),
        unread_count,
    }))
}

/// Mark one notification as read.
async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MarkReadRequest>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let updated = state
        .notification_service
        .mark_read(&user.id, &req.notification_id)
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

/// Mark all of the caller's notifications as read.
async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MarkAllReadResponse>> {
    let updated = state.notification_service.mark_all_read(&user.id).await?;

    Ok(ApiResponse::ok(MarkAllReadResponse { updated }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/content-published", post(content_published))
        .route("/list", post(list))
        .route("/mark-read", post(mark_read))
        .route("/mark-all-read", post(mark_all_read))
}
