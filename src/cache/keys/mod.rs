/// 缓存键模块
/// 提供各种缓存键生成函数

// 限流键模块
pub mod rate_limit_keys;

// 会话列表键模块
pub mod session_keys;

pub use rate_limit_keys::rate_limit_key;
pub use session_keys::{SESSION_LIST_CACHE, SessionListKey, session_list_user_prefix};
