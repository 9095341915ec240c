use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::keys::SessionListKey;
use crate::cache::models::CachedSessionList;
use crate::cache::operations::SessionListCache;
use crate::database::SessionEntity;
use crate::database::repositories::{SessionChanges, SessionRepository};
use crate::error::AppError;
use crate::models::page::{PageRequest, PageResponse};

/// 会话标题最大长度
pub const MAX_TITLE_CHARS: usize = 500;

/// 默认会话标题
pub const DEFAULT_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub title: String,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionEntity> for SessionResponse {
    fn from(session: SessionEntity) -> Self {
        Self {
            id: session.id,
            session_id: session.id,
            title: session.title,
            favorite: session.is_favorite,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub title: Option<String>,
}

impl CreateSessionRequest {
    fn title_or_default(&self) -> Result<String, AppError> {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => {
                check_title_length(title)?;
                Ok(title.to_string())
            }
            _ => Ok(DEFAULT_TITLE.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub is_favorite: Option<bool>,
}

impl UpdateSessionRequest {
    fn into_changes(self) -> Result<SessionChanges, AppError> {
        let title = match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => {
                check_title_length(title)?;
                Some(title.to_string())
            }
            // a blank title leaves the current one in place
            _ => None,
        };
        Ok(SessionChanges {
            title,
            favorite: self.is_favorite,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListSessionsQuery {
    pub favorite: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

fn check_title_length(title: &str) -> Result<(), AppError> {
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}

/// Every mutation evicts the caller's cached listings after the write is
/// committed and before the result is handed back, so a list request issued
/// after the mutation returns never sees a page captured before it.
#[derive(Clone)]
pub struct SessionService {
    repo: Arc<dyn SessionRepository>,
    cache: Option<SessionListCache>,
}

impl SessionService {
    pub fn new(repo: Arc<dyn SessionRepository>, cache: Option<SessionListCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn create(
        &self,
        user_id: &str,
        req: CreateSessionRequest,
    ) -> Result<SessionResponse, AppError> {
        let title = req.title_or_default()?;
        let session = self.repo.create(user_id, &title).await?;
        self.evict(user_id).await;
        Ok(session.into())
    }

    pub async fn list(
        &self,
        user_id: &str,
        favorite: Option<bool>,
        page: PageRequest,
    ) -> Result<PageResponse<SessionResponse>, AppError> {
        let key = SessionListKey::new(user_id, favorite, page.page, page.size);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.read(&key).await {
                return Ok(PageResponse::new(cached.content, page, cached.total_elements));
            }
        }

        let found = self.repo.find_by_user(user_id, favorite, page).await?;
        let content = found.content.into_iter().map(SessionResponse::from).collect();
        let response = PageResponse::new(content, page, found.total_elements);

        if let Some(cache) = &self.cache {
            cache
                .write(&key, &CachedSessionList::from(&response), cache.ttl())
                .await;
        }

        Ok(response)
    }

    pub async fn get(&self, user_id: &str, id: Uuid) -> Result<SessionResponse, AppError> {
        self.repo
            .find_by_id_and_user(id, user_id)
            .await?
            .map(SessionResponse::from)
            .ok_or(AppError::NotFound {
                resource: "Session",
                id,
            })
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        req: UpdateSessionRequest,
    ) -> Result<SessionResponse, AppError> {
        let changes = req.into_changes()?;
        let session = self
            .repo
            .update(id, user_id, changes)
            .await?
            .ok_or(AppError::NotFound {
                resource: "Session",
                id,
            })?;
        self.evict(user_id).await;
        Ok(session.into())
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id, user_id).await? {
            return Err(AppError::NotFound {
                resource: "Session",
                id,
            });
        }
        self.evict(user_id).await;
        Ok(())
    }

    async fn evict(&self, user_id: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate_user(user_id).await;
        }
    }
}
