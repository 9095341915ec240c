use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::MessageEntity;
use crate::models::page::{Page, PageRequest};

/// 待写入的消息
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub session_id: Uuid,
    pub sender: String,
    pub content: String,
    pub context: Option<serde_json::Value>,
}

/// 消息存储库
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: NewMessage) -> Result<MessageEntity, sqlx::Error>;

    /// 分页查询会话消息（按时间正序），仅限会话所有者
    async fn find_by_session(
        &self,
        session_id: Uuid,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<MessageEntity>, sqlx::Error>;
}

/// Postgres 消息存储库实现
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: NewMessage) -> Result<MessageEntity, sqlx::Error> {
        sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (id, session_id, sender, content, context, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, session_id, sender, content, context, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(message.session_id)
        .bind(message.sender)
        .bind(message.content)
        .bind(message.context)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_by_session(
        &self,
        session_id: Uuid,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<MessageEntity>, sqlx::Error> {
        let content = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT m.id, m.session_id, m.sender, m.content, m.context, m.created_at
            FROM messages m
            JOIN sessions s ON m.session_id = s.id
            WHERE m.session_id = $1 AND s.user_id = $2
            ORDER BY m.created_at ASC, m.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_elements: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages m
            JOIN sessions s ON m.session_id = s.id
            WHERE m.session_id = $1 AND s.user_id = $2
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page {
            content,
            total_elements,
        })
    }
}
