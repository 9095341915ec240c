use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use crate::error::ErrorResponse;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const USER_ID_HEADER: &str = "x-user-id";
const AUTH_SCHEME_PREFIX: &str = "ApiKey ";

/// 调用方身份（X-User-Id）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

/// 已配置的 API Key（仅保存摘要）
#[derive(Clone)]
pub struct ApiKeyAuth {
    expected: Option<Arc<[u8; 32]>>,
}

impl ApiKeyAuth {
    /// An empty key rejects every request.
    pub fn new(api_key: &str) -> Self {
        let expected = (!api_key.trim().is_empty()).then(|| Arc::new(digest(api_key.trim())));
        Self { expected }
    }

    fn accepts(&self, presented: &str) -> bool {
        match &self.expected {
            Some(expected) => digest(presented).as_slice() == expected.as_slice(),
            None => false,
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

fn presented_key(headers: &HeaderMap) -> Option<String> {
    let direct = headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());
    if let Some(key) = direct {
        return Some(key.to_string());
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix(AUTH_SCHEME_PREFIX))
        .map(|key| key.trim().to_string())
        .filter(|k| !k.is_empty())
}

pub async fn auth_middleware(
    State(auth): State<ApiKeyAuth>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let authorized = presented_key(req.headers()).is_some_and(|key| auth.accepts(&key));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "status": 401,
                "error": "Unauthorized",
                "message": "Missing or invalid API key"
            })),
        )
            .into_response();
    }

    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    match user_id {
        Some(user_id) => {
            req.extensions_mut().insert(CallerId(user_id));
            next.run(req).await
        }
        None => {
            let body = ErrorResponse::new(
                StatusCode::BAD_REQUEST,
                "Missing request header 'X-User-Id'",
                req.uri().path(),
            );
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn key_is_read_from_either_header() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret"));
        assert_eq!(presented_key(&headers).as_deref(), Some("secret"));

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("ApiKey  secret "));
        assert_eq!(presented_key(&headers).as_deref(), Some("secret"));

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer secret"));
        assert_eq!(presented_key(&headers), None);
    }

    #[test]
    fn empty_configured_key_accepts_nothing() {
        let auth = ApiKeyAuth::new("  ");
        assert!(!auth.accepts(""));
        assert!(!auth.accepts("anything"));

        let auth = ApiKeyAuth::new("secret");
        assert!(auth.accepts("secret"));
        assert!(!auth.accepts("secret2"));
    }
}
