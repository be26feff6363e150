//! Error-to-HTTP translation for the whole API surface.

use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use dealgate_audit::AuditError;
use dealgate_auth::AuthError;
use dealgate_core::{StoreError, Tier};
use dealgate_entitlements::EntitlementError;

/// API-level failure, translated to a JSON error response.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Entitlement(EntitlementError),
    /// Entitlement denial with the upgrade-prompt contract.
    FeatureDenied {
        feature: &'static str,
        required: Tier,
        current: Tier,
    },
    /// Handler detected a resource belonging to another organization.
    ScopeViolation,
    Audit(AuditError),
    Store(StoreError),
    NotFound(&'static str),
    Validation(String),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<EntitlementError> for ApiError {
    fn from(e: EntitlementError) -> Self {
        Self::Entitlement(e)
    }
}

impl From<AuditError> for ApiError {
    fn from(e: AuditError) -> Self {
        Self::Audit(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Auth(e) => auth_error_to_response(e),
            Self::Entitlement(e) => entitlement_error_to_response(e),
            Self::FeatureDenied {
                feature,
                required,
                current,
            } => feature_denied_response(feature, required, current),
            Self::ScopeViolation => json_error(
                StatusCode::FORBIDDEN,
                "resource_scope_violation",
                "Resource belongs to a different organization",
            ),
            Self::Audit(e) => json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "audit_error",
                e.to_string(),
            ),
            Self::Store(e) => json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                e.to_string(),
            ),
            Self::NotFound(what) => json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{what} not found"),
            ),
            Self::Validation(msg) => {
                json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
            }
        }
    }
}

fn auth_error_to_response(e: AuthError) -> axum::response::Response {
    match e {
        AuthError::AuthRequired => json_error(
            StatusCode::UNAUTHORIZED,
            "auth_required",
            "Authentication required",
        ),
        AuthError::InvalidToken(_) => json_error(
            StatusCode::UNAUTHORIZED,
            "auth_invalid",
            "Invalid or expired token",
        ),
        AuthError::InvalidClaims => json_error(
            StatusCode::UNAUTHORIZED,
            "auth_invalid",
            "Invalid session claims",
        ),
        AuthError::UserUnregistered => json_error(
            StatusCode::UNAUTHORIZED,
            "auth_user_unregistered",
            "User not registered",
        ),
        AuthError::ForbiddenRole(_) => {
            json_error(StatusCode::FORBIDDEN, "forbidden_role", e.to_string())
        }
        AuthError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        ),
    }
}

fn entitlement_error_to_response(e: EntitlementError) -> axum::response::Response {
    match e {
        EntitlementError::FeatureNotFound(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "feature_not_found",
            e.to_string(),
        ),
        EntitlementError::Directory(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "clerk_api_error",
            "Subscription lookup failed",
        ),
    }
}

fn feature_denied_response(
    feature: &'static str,
    required: Tier,
    current: Tier,
) -> axum::response::Response {
    let message = format!(
        "This feature requires the {} plan or higher. Your current plan is {}.",
        required.display_name(),
        current.display_name(),
    );

    let mut response = json_error(StatusCode::FORBIDDEN, "forbidden_feature", message);
    let headers = response.headers_mut();
    headers.insert("x-required-tier", HeaderValue::from_static(required.as_str()));
    headers.insert("x-upgrade-url", HeaderValue::from_static("/pricing"));
    headers.insert("x-feature-locked", HeaderValue::from_static(feature));
    response
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
