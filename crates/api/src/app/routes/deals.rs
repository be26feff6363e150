//! Deal routes: the representative cached + invalidated resource.
//!
//! Handler bodies are thin; the deal domain itself lives elsewhere. What
//! matters here is the composition: GETs flow through the response cache,
//! mutations invalidate the organization's slice of it.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::caching::{self, CacheConfig, CacheLayer};
use crate::context::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct CreateDealRequest {
    pub name: String,
    /// Optional explicit scope; must match the caller's organization.
    pub organization_id: Option<String>,
}

pub fn router(services: &Arc<AppServices>) -> Router {
    let cache_layer = CacheLayer::new(services.cache.clone(), CacheConfig::default());

    Router::new()
        .route("/", get(list_deals).post(create_deal))
        .layer(axum::middleware::from_fn_with_state(
            cache_layer,
            caching::cached_response,
        ))
}

/// GET /api/deals
pub async fn list_deals(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(serde_json::json!({
        "deals": [],
        "organization_id": user.0.organization_id.as_ref().map(|o| o.as_str()),
    }))
}

/// POST /api/deals
pub async fn create_deal(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateDealRequest>,
) -> Response {
    let user = user.0;

    if body.name.trim().is_empty() {
        return ApiError::Validation("name must not be empty".to_string()).into_response();
    }

    let Some(org_id) = user.organization_id.clone() else {
        return ApiError::Validation("caller has no organization".to_string()).into_response();
    };

    if let Some(requested) = &body.organization_id {
        if requested != org_id.as_str() {
            let detail = format!(
                "Attempted deal creation in organization {requested} from {org_id}"
            );
            if let Err(e) = services
                .audit
                .log_scope_violation(user.id, Some(org_id), detail)
                .await
            {
                return ApiError::Store(e).into_response();
            }
            return ApiError::ScopeViolation.into_response();
        }
    }

    let removed = services
        .cache
        .invalidate_pattern(&format!("api:v1:deals:{org_id}:*"))
        .await;
    info!(organization = %org_id, removed, "deal created; cache invalidated");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "name": body.name,
            "organization_id": org_id.as_str(),
        })),
    )
        .into_response()
}
