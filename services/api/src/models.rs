//! API models for request and response payloads

use serde::{Deserialize, Serialize};

pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

/// Response envelope for paginated listings
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// Query parameters shared by plain list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Clamp raw paging parameters to sane bounds
    pub fn clamp(&self, default_limit: u32) -> Paging {
        clamp_paging(self.page, self.limit, default_limit)
    }
}

/// Paging parameters after clamping
#[derive(Debug, Clone, Copy)]
pub struct Paging {
    pub page: u32,
    pub limit: u32,
    pub offset: i64,
}

/// Clamp raw paging parameters: pages start at 1 and page sizes are
/// capped at 100
pub fn clamp_paging(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Paging {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, 100);
    let offset = i64::from(page - 1) * i64::from(limit);

    Paging {
        page,
        limit,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_paging_defaults() {
        let paging = clamp_paging(None, None, 6);
        assert_eq!(paging.page, 1);
        assert_eq!(paging.limit, 6);
        assert_eq!(paging.offset, 0);
    }

    #[test]
    fn test_clamp_paging_bounds() {
        let paging = clamp_paging(Some(0), Some(1000), 6);
        assert_eq!(paging.page, 1);
        assert_eq!(paging.limit, 100);

        let paging = clamp_paging(Some(3), Some(10), 6);
        assert_eq!(paging.offset, 20);
    }
}
