use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::SessionEntity;
use crate::models::page::{Page, PageRequest};

/// 会话部分更新内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionChanges {
    pub title: Option<String>,
    pub favorite: Option<bool>,
}

/// 会话存储库
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, user_id: &str, title: &str) -> Result<SessionEntity, sqlx::Error>;

    /// 按用户分页查询，`favorite` 为空时不过滤
    async fn find_by_user(
        &self,
        user_id: &str,
        favorite: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<SessionEntity>, sqlx::Error>;

    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<SessionEntity>, sqlx::Error>;

    async fn update(
        &self,
        id: Uuid,
        user_id: &str,
        changes: SessionChanges,
    ) -> Result<Option<SessionEntity>, sqlx::Error>;

    /// 删除会话及其消息，返回是否存在
    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, sqlx::Error>;
}

const SESSION_COLUMNS: &str = "id, user_id, title, is_favorite, created_at, updated_at";

/// Postgres 会话存储库实现
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, user_id: &str, title: &str) -> Result<SessionEntity, sqlx::Error> {
        let session = sqlx::query_as::<_, SessionEntity>(&format!(
            r#"
            INSERT INTO sessions (id, user_id, title, is_favorite, created_at, updated_at)
            VALUES ($1, $2, $3, false, NOW(), NOW())
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created session {} for {}", session.id, user_id);
        Ok(session)
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        favorite: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<SessionEntity>, sqlx::Error> {
        let content = sqlx::query_as::<_, SessionEntity>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE user_id = $1
                AND ($2::boolean IS NULL OR is_favorite = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(favorite)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_elements: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM sessions
            WHERE user_id = $1
                AND ($2::boolean IS NULL OR is_favorite = $2)
            "#,
        )
        .bind(user_id)
        .bind(favorite)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page {
            content,
            total_elements,
        })
    }

    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<SessionEntity>, sqlx::Error> {
        sqlx::query_as::<_, SessionEntity>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: &str,
        changes: SessionChanges,
    ) -> Result<Option<SessionEntity>, sqlx::Error> {
        sqlx::query_as::<_, SessionEntity>(&format!(
            r#"
            UPDATE sessions
            SET title = COALESCE($3, title),
                is_favorite = COALESCE($4, is_favorite),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(changes.title)
        .bind(changes.favorite)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, sqlx::Error> {
        // messages go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
