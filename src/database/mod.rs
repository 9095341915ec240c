// 数据库模块
// 包含数据库实体定义和存储库操作

pub mod models; // 数据库实体定义
pub mod repositories; // 存储库接口与 Postgres 实现

// 重新导出常用类型和函数，方便其他模块使用
pub use models::{MessageEntity, SessionEntity};
pub use repositories::{
    MessageRepository, PgMessageRepository, PgSessionRepository, SessionRepository,
};

use sqlx::PgPool;

/// 执行数据库迁移
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
