use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::CurrentUser;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    let user = user.0;
    Json(serde_json::json!({
        "id": user.id.to_string(),
        "email": user.email,
        "role": user.role.as_str(),
        "organization_id": user.organization_id.as_ref().map(|o| o.as_str()),
    }))
}
