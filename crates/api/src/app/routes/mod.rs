use std::sync::Arc;

use axum::{routing::get, Router};

use crate::app::services::AppServices;

pub mod admin;
pub mod deals;
pub mod podcasts;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router(services: &Arc<AppServices>) -> Router {
    Router::new()
        .route("/api/me", get(system::whoami))
        .nest("/api/deals", deals::router(services))
        .nest("/api/podcasts", podcasts::router(services))
        .nest("/api/admin", admin::router())
}
