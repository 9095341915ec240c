// 分页相关的数据结构

use serde::{Deserialize, Serialize};

/// 默认每页数量
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 每页数量上限
pub const MAX_PAGE_SIZE: u32 = 2000;

/// 分页查询参数
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    /// 页码，从0开始
    pub page: Option<u32>,
    /// 每页数量
    pub size: Option<u32>,
}

/// 规范化后的分页请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        };
        Self { page, size }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl From<PageParams> for PageRequest {
    fn from(params: PageParams) -> Self {
        Self::new(
            params.page.unwrap_or(0),
            params.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

/// 仓储层返回的一页数据
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
}

/// 列表接口的分页响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: u32,
    pub size: u32,
    pub number: u32,
    pub first: bool,
    pub last: bool,
}

impl<T> PageResponse<T> {
    /// Paging metadata always comes from the caller's request, never from a stored snapshot.
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let total_pages = total_pages(total_elements, request.size);
        Self {
            content,
            total_elements,
            total_pages,
            size: request.size,
            number: request.page,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
        }
    }
}

/// 计算总页数
pub fn total_pages(total_elements: i64, size: u32) -> u32 {
    if size == 0 || total_elements <= 0 {
        return 0;
    }
    let size = i64::from(size);
    u32::try_from((total_elements + size - 1) / size).unwrap_or(u32::MAX)
}
