//! Page/size pagination helpers for list endpoints.

use serde::{Deserialize, Serialize};

/// A validated page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Builds a page request from optional query values.
    ///
    /// Missing or zero values fall back to page 1 and `default_size`; sizes are
    /// clamped to `max_size`.
    pub fn new(page: Option<u32>, page_size: Option<u32>, default_size: u32, max_size: u32) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s > 0)
            .unwrap_or(default_size)
            .min(max_size.max(1));
        Self { page, page_size }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

/// Paged response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            pages: total_pages(total, request.page_size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            pages: self.pages,
        }
    }
}

/// Number of pages needed for `total` rows.
pub fn total_pages(total: i64, page_size: u32) -> u32 {
    if total <= 0 || page_size == 0 {
        return 0;
    }
    let size = i64::from(page_size);
    u32::try_from((total + size - 1) / size).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let req = PageRequest::new(None, None, 50, 100);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 50);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_zero_values_fall_back() {
        let req = PageRequest::new(Some(0), Some(0), 20, 100);
        assert_eq!(req, PageRequest { page: 1, page_size: 20 });
    }

    #[test]
    fn test_page_size_clamped() {
        let req = PageRequest::new(Some(3), Some(1000), 50, 100);
        assert_eq!(req.page_size, 100);
        assert_eq!(req.offset(), 200);
        assert_eq!(req.limit(), 100);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
    }

    #[test]
    fn test_page_map_keeps_meta() {
        let req = PageRequest::new(Some(2), Some(2), 50, 100);
        let page = Page::new(vec![1, 2], 5, req).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.pages, 3);
        assert_eq!(page.page, 2);
    }
}
