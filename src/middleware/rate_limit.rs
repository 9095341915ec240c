use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::cache::operations::FixedWindowLimiter;
use crate::error::{AppError, ErrorResponse};

use super::client_key::resolve_client_key;

/// Without a limiter (no shared store configured) every request is admitted.
#[derive(Clone)]
pub struct Admission {
    limiter: Option<Arc<FixedWindowLimiter>>,
    health_path_prefix: Arc<str>,
}

impl Admission {
    pub fn new(limiter: Option<Arc<FixedWindowLimiter>>, health_path_prefix: &str) -> Self {
        Self {
            limiter,
            health_path_prefix: Arc::from(health_path_prefix),
        }
    }
}

pub async fn rate_limit(
    State(admission): State<Admission>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if path.starts_with(&*admission.health_path_prefix) {
        return next.run(req).await;
    }
    let Some(limiter) = admission.limiter.as_ref() else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let client_key = resolve_client_key(req.headers(), peer);
    let decision = limiter.admit(&client_key).await;

    if !decision.allowed {
        if decision.degraded {
            return AppError::ServiceUnavailable.into_response();
        }
        tracing::debug!(
            "Rejected {} on {}: {} requests in window",
            client_key,
            path,
            decision.current_count
        );
        let retry_after = decision.retry_after.unwrap_or(limiter.window()).as_secs().max(1);
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::rate_limited(path)),
        )
            .into_response();
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(retry_after));
        return response;
    }

    let mut response = next.run(req).await;
    if !decision.degraded {
        let limit = limiter.max_requests();
        let remaining = limit.saturating_sub(u64::try_from(decision.current_count).unwrap_or(0));
        let headers = response.headers_mut();
        headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
    }
    response
}
