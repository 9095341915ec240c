use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{Level, debug, error, warn};

use super::request_id::RequestId;
use crate::error::ErrorResponse;

/// 错误响应的日志级别，限流拒绝只记 debug
fn log_level(status: StatusCode) -> Option<Level> {
    if status.is_server_error() {
        Some(Level::ERROR)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Some(Level::DEBUG)
    } else if status.is_client_error() {
        Some(Level::WARN)
    } else {
        None
    }
}

/// 记录错误响应，并补全错误体中的请求路径
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let response = next.run(req).await;

    let status = response.status();
    match log_level(status) {
        None => return response,
        Some(Level::ERROR) => error!(
            "Server error occurred - [{}] {} {} -> {}",
            request_id, method, path, status
        ),
        Some(Level::WARN) => warn!("Client error - [{}] {} {} -> {}", request_id, method, path, status),
        Some(_) => debug!("Rejected - [{}] {} {} -> {}", request_id, method, path, status),
    }

    let Some(mut body) = response.extensions().get::<ErrorResponse>().cloned() else {
        return response;
    };
    if !body.path.is_empty() {
        return response;
    }

    // 重建响应体，保留其余响应头
    body.path = path;
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    let rebuilt = Json(body).into_response();
    let (_, new_body) = rebuilt.into_parts();
    Response::from_parts(parts, new_body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_rejections_log_at_debug() {
        assert_eq!(log_level(StatusCode::TOO_MANY_REQUESTS), Some(Level::DEBUG));
    }

    #[test]
    fn other_failures_keep_their_levels() {
        assert_eq!(log_level(StatusCode::NOT_FOUND), Some(Level::WARN));
        assert_eq!(log_level(StatusCode::UNAUTHORIZED), Some(Level::WARN));
        assert_eq!(log_level(StatusCode::SERVICE_UNAVAILABLE), Some(Level::ERROR));
        assert_eq!(log_level(StatusCode::OK), None);
        assert_eq!(log_level(StatusCode::NO_CONTENT), None);
    }
}
