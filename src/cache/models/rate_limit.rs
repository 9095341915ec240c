use std::time::Duration;

/// 限流判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// 当前窗口内的计数（含本次请求）；存储不可用时为0
    pub current_count: i64,
    /// 窗口剩余时间
    pub retry_after: Option<Duration>,
    /// 存储不可用，结果由失败策略决定
    pub degraded: bool,
}
