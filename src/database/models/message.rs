use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 消息数据库实体
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageEntity {
    pub id: Uuid,
    pub session_id: Uuid,
    /// 发送方：USER / ASSISTANT / SYSTEM
    pub sender: String,
    pub content: String,
    /// 检索上下文（jsonb）
    pub context: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
