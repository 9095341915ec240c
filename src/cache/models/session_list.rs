use serde::{Deserialize, Serialize};

use crate::models::page::PageResponse;
use crate::routes::session::model::SessionResponse;

/// 会话列表缓存数据模型（分页快照）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CachedSessionList {
    pub content: Vec<SessionResponse>,
    pub total_elements: i64,
    pub total_pages: u32,
    pub size: u32,
    pub number: u32,
}

impl CachedSessionList {
    /// A snapshot may never hold more rows than the page size it was taken for.
    pub fn is_consistent(&self) -> bool {
        self.content.len() <= self.size as usize
    }
}

impl From<&PageResponse<SessionResponse>> for CachedSessionList {
    fn from(page: &PageResponse<SessionResponse>) -> Self {
        Self {
            content: page.content.clone(),
            total_elements: page.total_elements,
            total_pages: page.total_pages,
            size: page.size,
            number: page.number,
        }
    }
}
