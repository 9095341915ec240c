use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 服务状态
    pub status: &'static str,
    /// 服务器时间
    pub timestamp: i64,
    /// 共享存储状态：up / down / disabled
    pub store: &'static str,
}

/// 健康检查接口，不经过限流与认证
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match &state.store {
        None => "disabled",
        Some(store) => match store.ping().await {
            Ok(()) => "up",
            Err(e) => {
                tracing::warn!("Shared store health check failed: {}", e);
                "down"
            }
        },
    };

    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().timestamp(),
        store,
    })
}
