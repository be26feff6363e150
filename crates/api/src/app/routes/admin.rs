//! Admin routes: audited identity administration and cache tooling.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use dealgate_audit::AuditAction;
use dealgate_auth::Role;
use dealgate_core::{OrgId, UserId};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;
use crate::middleware;

// ─────────────────────────────────────────────────────────────────────────────
// Request DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ImpersonateRequest {
    pub target_id: Uuid,
}

#[derive(Debug, Deserialize, Default)]
pub struct ClearTiersRequest {
    pub organization_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    let admin = Router::new()
        .route("/users/:id/role", patch(change_role))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/restore", post(restore_user))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/reset", post(reset_cache_stats))
        .route("/tiers/clear", post(clear_tiers))
        .layer(axum::middleware::from_fn(middleware::admin_middleware));

    let master_admin = Router::new()
        .route("/impersonate", post(impersonate))
        .layer(axum::middleware::from_fn(
            middleware::master_admin_middleware,
        ));

    admin.merge(master_admin)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// PATCH /api/admin/users/:id/role
pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangeRoleRequest>,
) -> Response {
    let new_role = match Role::from_str(&body.role) {
        Ok(role) => role,
        Err(e) => return ApiError::Validation(e.to_string()).into_response(),
    };

    let target_id = UserId::from_uuid(id);
    let target = match services.users.find_by_id(target_id).await {
        Ok(Some(target)) => target,
        Ok(None) => return ApiError::NotFound("user").into_response(),
        Err(e) => return ApiError::Store(e).into_response(),
    };

    if let Err(e) = services.users.set_role(target_id, new_role).await {
        return ApiError::Store(e).into_response();
    }

    let detail = format!("Role changed from {} to {}", target.role, new_role);
    if let Err(e) = services
        .audit
        .log_role_change(
            actor.0.id,
            target_id,
            target.organization_id.clone(),
            detail,
        )
        .await
    {
        return ApiError::Store(e).into_response();
    }

    Json(serde_json::json!({
        "id": target_id.to_string(),
        "role": new_role.as_str(),
    }))
    .into_response()
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Response {
    let target_id = UserId::from_uuid(id);
    let target = match services.users.find_by_id(target_id).await {
        Ok(Some(target)) => target,
        Ok(None) => return ApiError::NotFound("user").into_response(),
        Err(e) => return ApiError::Store(e).into_response(),
    };

    if let Err(e) = services.users.set_deleted(target_id, true).await {
        return ApiError::Store(e).into_response();
    }

    if let Err(e) = services
        .audit
        .log_user_status_change(
            actor.0.id,
            target_id,
            target.organization_id.clone(),
            AuditAction::UserDeleted,
            format!("User {} soft-deleted", target.email),
        )
        .await
    {
        return ApiError::from(e).into_response();
    }

    StatusCode::NO_CONTENT.into_response()
}

/// POST /api/admin/users/:id/restore
pub async fn restore_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Response {
    let target_id = UserId::from_uuid(id);

    // Soft-deleted users are invisible to lookups, so restore first and
    // treat a still-missing record as an unknown id.
    if let Err(e) = services.users.set_deleted(target_id, false).await {
        return ApiError::Store(e).into_response();
    }

    let target = match services.users.find_by_id(target_id).await {
        Ok(Some(target)) => target,
        Ok(None) => return ApiError::NotFound("user").into_response(),
        Err(e) => return ApiError::Store(e).into_response(),
    };

    if let Err(e) = services
        .audit
        .log_user_status_change(
            actor.0.id,
            target_id,
            target.organization_id.clone(),
            AuditAction::UserRestored,
            format!("User {} restored", target.email),
        )
        .await
    {
        return ApiError::from(e).into_response();
    }

    Json(serde_json::json!({
        "id": target_id.to_string(),
        "is_active": true,
    }))
    .into_response()
}

/// POST /api/admin/impersonate
pub async fn impersonate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<CurrentUser>,
    Json(body): Json<ImpersonateRequest>,
) -> Response {
    let target_id = UserId::from_uuid(body.target_id);
    let target = match services.users.find_by_id(target_id).await {
        Ok(Some(target)) => target,
        Ok(None) => return ApiError::NotFound("user").into_response(),
        Err(e) => return ApiError::Store(e).into_response(),
    };

    if let Err(e) = services
        .audit
        .log_impersonation(
            actor.0.id,
            target_id,
            target.organization_id.clone(),
            format!("Impersonation of {}", target.email),
        )
        .await
    {
        return ApiError::Store(e).into_response();
    }

    Json(serde_json::json!({
        "target_id": target_id.to_string(),
        "role": target.role.as_str(),
        "organization_id": target.organization_id.as_ref().map(|o| o.as_str()),
    }))
    .into_response()
}

/// GET /api/admin/cache/stats
pub async fn cache_stats(Extension(services): Extension<Arc<AppServices>>) -> Response {
    Json(services.cache.stats().await).into_response()
}

/// POST /api/admin/cache/reset
pub async fn reset_cache_stats(Extension(services): Extension<Arc<AppServices>>) -> Response {
    services.cache.reset_stats().await;
    StatusCode::NO_CONTENT.into_response()
}

/// POST /api/admin/tiers/clear
///
/// Billing-webhook hook: drops one cached tier or all of them.
pub async fn clear_tiers(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<ClearTiersRequest>>,
) -> Response {
    let org_id = body
        .and_then(|Json(b)| b.organization_id)
        .map(OrgId::new);
    services.resolver.clear_tier_cache(org_id.as_ref());
    StatusCode::NO_CONTENT.into_response()
}
