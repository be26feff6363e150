//! GET-response caching middleware.
//!
//! Keys are tenant-scoped (see `dealgate-cache`); a cache outage or any
//! Redis error degrades to invoking the handler. Bodies are cached only
//! when the handler returned 200 with valid JSON.

use std::collections::BTreeMap;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use dealgate_cache::{cache_key, ResponseCache, HITS_KEY, MISSES_KEY};

use crate::app::errors::json_error;
use crate::context::CurrentUser;

pub const RESPONSE_CACHE_TTL_SECONDS: u64 = 300;

/// Per-route cache policy.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    /// Append the user id to the key so users never share entries.
    pub user_specific: bool,
    /// Request header that opts out of caching when its value is `true`.
    pub bypass_header: &'static str,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: RESPONSE_CACHE_TTL_SECONDS,
            user_specific: false,
            bypass_header: "x-cache-bypass",
        }
    }
}

/// State for [`cached_response`].
#[derive(Clone)]
pub struct CacheLayer {
    pub cache: ResponseCache,
    pub config: CacheConfig,
}

impl CacheLayer {
    pub fn new(cache: ResponseCache, config: CacheConfig) -> Self {
        Self { cache, config }
    }
}

/// Serve GETs from the response cache, populating it on miss.
///
/// Skips caching (handler runs normally, no counters touched) when the
/// request is not a GET, has no authenticated organization, carries the
/// bypass header, or no cache backend is configured.
pub async fn cached_response(
    State(layer): State<CacheLayer>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    let Some(user) = req.extensions().get::<CurrentUser>().cloned() else {
        return next.run(req).await;
    };
    let Some(org_id) = user.0.organization_id.clone() else {
        return next.run(req).await;
    };

    if bypass_requested(&req, layer.config.bypass_header) || !layer.cache.is_configured() {
        return next.run(req).await;
    }

    let params = query_params(req.uri().query());
    let user_id = layer.config.user_specific.then_some(user.0.id);
    let key = cache_key(req.uri().path(), &org_id, &params, user_id.as_ref());

    if let Some(cached) = layer.cache.get(&key).await {
        layer.cache.incr(HITS_KEY).await;
        return hit_response(cached);
    }
    layer.cache.incr(MISSES_KEY).await;

    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "failed to buffer response body");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "failed to buffer response",
            );
        }
    };

    // Only well-formed JSON bodies are cacheable.
    if let Ok(text) = std::str::from_utf8(&bytes) {
        if serde_json::from_str::<serde_json::Value>(text).is_ok() {
            layer.cache.set(&key, layer.config.ttl_seconds, text).await;
        }
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn bypass_requested(req: &Request<Body>, bypass_header: &str) -> bool {
    req.headers()
        .get(bypass_header)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn query_params(query: Option<&str>) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(key.to_string(), value.to_string());
    }
    params
}

fn hit_response(body: String) -> Response {
    let mut response = (StatusCode::OK, body).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
        .headers_mut()
        .insert("x-cache", HeaderValue::from_static("HIT"));
    response
}
