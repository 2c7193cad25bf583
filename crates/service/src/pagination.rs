//! Pagination parameters and the metadata returned next to a page of items.

use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub use models::coverage::MAX_PER_PAGE;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page, at most [`MAX_PER_PAGE`]
    pub per_page: u64,
}

impl Default for Pagination {
    fn default() -> Self { Self { page: DEFAULT_PAGE, per_page: DEFAULT_PER_PAGE } }
}

/// `pagination` object of a list response.
///
/// Links are relative URLs; `prev`/`next` are empty when there is no such page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub pages: u64,
    pub total: u64,
    pub current: String,
    pub first: String,
    pub last: String,
    pub prev: String,
    pub next: String,
}

impl PaginationMeta {
    pub fn build(p: Pagination, total: u64, pages: u64, path: &str) -> Self {
        let link = |page: u64| format!("{path}?page={page}&per_page={}", p.per_page);
        let prev = if p.page > 1 { link(p.page - 1) } else { String::new() };
        let next = if p.page < pages { link(p.page + 1) } else { String::new() };
        Self {
            page: p.page,
            per_page: p.per_page,
            pages,
            total,
            current: link(p.page),
            first: link(1),
            last: link(pages.max(1)),
            prev,
            next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }

    #[test]
    fn middle_page_has_both_neighbours() {
        let meta = PaginationMeta::build(Pagination { page: 2, per_page: 10 }, 25, 3, "/coverages");
        assert_eq!(meta.prev, "/coverages?page=1&per_page=10");
        assert_eq!(meta.next, "/coverages?page=3&per_page=10");
        assert_eq!(meta.last, "/coverages?page=3&per_page=10");
        assert_eq!(meta.current, "/coverages?page=2&per_page=10");
    }

    #[test]
    fn single_page_has_no_neighbours() {
        let meta = PaginationMeta::build(Pagination::default(), 2, 1, "/coverages");
        assert_eq!(meta.pages, 1);
        assert_eq!(meta.total, 2);
        assert!(meta.prev.is_empty());
        assert!(meta.next.is_empty());
    }

    #[test]
    fn empty_table_still_links_first_page() {
        let meta = PaginationMeta::build(Pagination::default(), 0, 0, "/coverages");
        assert_eq!(meta.last, "/coverages?page=1&per_page=20");
        assert!(meta.next.is_empty());
    }
}
