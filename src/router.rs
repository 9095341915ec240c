use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::AppState;
use crate::config::Config;
use crate::middleware::{
    API_KEY_HEADER, REQUEST_ID_HEADER, USER_ID_HEADER, auth_middleware, log_errors, rate_limit,
    request_id,
};
use crate::routes::{health, message, session};

pub const API_BASE_URI: &str = "/api/v1";

/// 请求处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RequestId,
    Trace,
    Cors,
    ErrorLog,
    Admission,
    Timeout,
}

/// 中间件顺序，外层在前
pub const MIDDLEWARE_ORDER: [Stage; 6] = [
    Stage::RequestId,
    Stage::Trace,
    Stage::Cors,
    Stage::ErrorLog,
    Stage::Admission,
    Stage::Timeout,
];

impl Stage {
    fn apply(self, router: Router<AppState>, state: &AppState) -> Router<AppState> {
        match self {
            Stage::RequestId => router.layer(from_fn(request_id)),
            Stage::Trace => router.layer(TraceLayer::new_for_http()),
            Stage::Cors => router.layer(cors_layer(&state.config)),
            Stage::ErrorLog => router.layer(from_fn(log_errors)),
            Stage::Admission => router.layer(from_fn_with_state(state.admission.clone(), rate_limit)),
            Stage::Timeout => router.layer(timeout_layer(&state.config)),
        }
    }
}

fn timeout_layer(config: &Config) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(API_KEY_HEADER),
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// 组装完整路由
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/sessions",
            post(session::create_session).get(session::list_sessions),
        )
        .route(
            "/sessions/{id}",
            get(session::get_session)
                .patch(session::update_session)
                .delete(session::delete_session),
        )
        .route(
            "/sessions/{id}/messages",
            post(message::add_message).get(message::list_messages),
        )
        .layer(from_fn_with_state(state.auth.clone(), auth_middleware));

    let routes = Router::new()
        .nest(API_BASE_URI, api)
        .route(&state.config.health_path_prefix, get(health::health));

    MIDDLEWARE_ORDER
        .iter()
        .rev()
        .fold(routes, |router, stage| stage.apply(router, &state))
        .with_state(state)
}
