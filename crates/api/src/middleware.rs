//! Request middleware: authentication, role gates, and the feature gate.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use dealgate_auth::{require_admin, require_master_admin, require_min_role, Role};
use dealgate_core::Tier;
use dealgate_entitlements::EntitlementResolver;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

/// Authenticate the request and attach [`CurrentUser`].
///
/// Runs before every protected route. A missing, invalid, or mismatching
/// token never reaches a handler.
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = bearer_token(req.headers());

    match services.guard.authenticate(token).await {
        Ok(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn current_user(req: &Request<Body>) -> Result<CurrentUser, ApiError> {
    req.extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(ApiError::Auth(dealgate_auth::AuthError::AuthRequired))
}

/// State for [`min_role_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct MinRole(pub Role);

pub async fn min_role_middleware(
    State(MinRole(minimum)): State<MinRole>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    match require_min_role(&user.0, minimum) {
        Ok(()) => next.run(req).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn admin_middleware(req: Request<Body>, next: Next) -> Response {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    match require_admin(&user.0) {
        Ok(()) => next.run(req).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn master_admin_middleware(req: Request<Body>, next: Next) -> Response {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    match require_master_admin(&user.0) {
        Ok(()) => next.run(req).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// State for [`feature_middleware`]: one gated feature per route.
#[derive(Clone)]
pub struct FeatureGate {
    pub services: Arc<AppServices>,
    pub feature: &'static str,
}

impl FeatureGate {
    pub fn new(services: &Arc<AppServices>, feature: &'static str) -> Self {
        Self {
            services: services.clone(),
            feature,
        }
    }
}

/// Tier-based entitlement gate.
///
/// Admin-tier users bypass entitlement checks entirely. Everyone else is
/// resolved to their organization's tier (no organization reads as
/// `starter`) and compared against the feature's catalogue minimum. Denials
/// carry the upgrade headers consumed by the frontend paywall.
pub async fn feature_middleware(
    State(gate): State<FeatureGate>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    if user.0.role.is_admin_tier() {
        return next.run(req).await;
    }

    let required = match EntitlementResolver::required_tier(gate.feature) {
        Ok(required) => required,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let current = match &user.0.organization_id {
        Some(org_id) => match gate.services.resolver.organization_tier(org_id).await {
            Ok(tier) => tier,
            Err(e) => return ApiError::from(e).into_response(),
        },
        None => Tier::Starter,
    };

    if current >= required {
        next.run(req).await
    } else {
        ApiError::FeatureDenied {
            feature: gate.feature,
            required,
            current,
        }
        .into_response()
    }
}
