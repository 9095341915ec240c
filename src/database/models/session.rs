use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 会话数据库实体
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionEntity {
    pub id: Uuid,
    /// 所属用户（不透明标识）
    pub user_id: String,
    pub title: String,
    pub is_favorite: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
