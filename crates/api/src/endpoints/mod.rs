//! API endpoints.

mod follows;
mod likes;
mod notifications;
mod polls;
mod saves;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/likes", likes::router())
        .nest("/saves", saves::router())
        .nest("/follows", follows::router())
        .nest("/polls", polls::router())
        .nest("/notifications", notifications::router())
}
