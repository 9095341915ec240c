use axum::{
    extract::{
        Extension, Json, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use uuid::Uuid;

use super::model::{AddMessageRequest, MessageResponse};
use crate::AppState;
use crate::error::AppError;
use crate::middleware::CallerId;
use crate::models::page::{PageParams, PageRequest, PageResponse};
use crate::routes::session::session_id;

#[axum::debug_handler]
pub async fn add_message(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<AddMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let id = session_id(path)?;
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let message = state.messages.add(&user_id, id, req).await?;
    tracing::debug!("Added {} message {} to session {}", message.sender, message.id, id);
    Ok((StatusCode::CREATED, Json(message)))
}

#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(CallerId(user_id)): Extension<CallerId>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<PageResponse<MessageResponse>>, AppError> {
    let id = session_id(path)?;
    let Query(params) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let messages = state
        .messages
        .list(&user_id, id, PageRequest::from(params))
        .await?;
    Ok(Json(messages))
}
