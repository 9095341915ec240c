/// 缓存操作
/// 提供缓存操作的功能实现

// 通用键值缓存
pub mod kv;

// 固定窗口限流
pub mod rate_limit;

// 会话列表缓存
pub mod session_list;

// 重新导出常用操作
pub use kv::KeyValueCache;
pub use rate_limit::FixedWindowLimiter;
pub use session_list::SessionListCache;
