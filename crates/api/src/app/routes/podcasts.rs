//! Podcast routes: the representative feature-gated endpoints.

use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};

use dealgate_auth::Role;

use crate::app::services::AppServices;
use crate::context::CurrentUser;
use crate::middleware::{self, FeatureGate, MinRole};

pub fn router(services: &Arc<AppServices>) -> Router {
    Router::new()
        .route(
            "/audio",
            get(audio).layer(axum::middleware::from_fn_with_state(
                FeatureGate::new(services, "podcast_audio"),
                middleware::feature_middleware,
            )),
        )
        .route(
            "/video",
            get(video).layer(axum::middleware::from_fn_with_state(
                FeatureGate::new(services, "podcast_video"),
                middleware::feature_middleware,
            )),
        )
        .route(
            "/live",
            get(live)
                .layer(axum::middleware::from_fn_with_state(
                    MinRole(Role::Enterprise),
                    middleware::min_role_middleware,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    FeatureGate::new(services, "live_streaming"),
                    middleware::feature_middleware,
                )),
        )
}

pub async fn audio(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(serde_json::json!({
        "podcasts": [],
        "format": "audio",
        "organization_id": user.0.organization_id.as_ref().map(|o| o.as_str()),
    }))
}

pub async fn video(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(serde_json::json!({
        "podcasts": [],
        "format": "video",
        "organization_id": user.0.organization_id.as_ref().map(|o| o.as_str()),
    }))
}

pub async fn live(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(serde_json::json!({
        "streams": [],
        "organization_id": user.0.organization_id.as_ref().map(|o| o.as_str()),
    }))
}
