//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use newsdesk_core::{EngagementService, NotificationService, PollService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub engagement_service: EngagementService,
    pub poll_service: PollService,
    pub notification_service: NotificationService,
    /// Shared secret for the CMS publish webhook, from config.
    pub webhook_token: Option<String>,
}

/// Authentication middleware.
///
/// Resolves a bearer token into the caller's user record and stores it in
/// request extensions; the extractors decide whether identity is required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
