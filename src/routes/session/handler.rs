use axum::{
    extract::{
        Extension, Json, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::model::{CreateSessionRequest, ListSessionsQuery, SessionResponse, UpdateSessionRequest};
use crate::AppState;
use crate::error::AppError;
use crate::middleware::CallerId;
use crate::models::page::{PageRequest, PageResponse};

pub(crate) fn session_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::BadRequest("Invalid session id".into()))
}

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let session = state.sessions.create(&user_id, req).await?;
    tracing::info!("Created session {} for {}", session.id, user_id);
    Ok((StatusCode::CREATED, Json(session)))
}

#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    query: Result<Query<ListSessionsQuery>, QueryRejection>,
) -> Result<Json<PageResponse<SessionResponse>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = PageRequest::new(query.page.unwrap_or(0), query.size.unwrap_or(0));
    let sessions = state.sessions.list(&user_id, query.favorite, page).await?;
    Ok(Json(sessions))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = session_id(path)?;
    Ok(Json(state.sessions.get(&user_id, id).await?))
}

#[axum::debug_handler]
pub async fn update_session(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateSessionRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = session_id(path)?;
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(Json(state.sessions.update(&user_id, id, req).await?))
}

#[axum::debug_handler]
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = session_id(path)?;
    state.sessions.delete(&user_id, id).await?;
    tracing::info!("Deleted session {} for {}", id, user_id);
    Ok(StatusCode::NO_CONTENT)
}
