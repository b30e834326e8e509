//! Page-number pagination on top of skip/take.

use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Zero page becomes the first one; `per_page` is clamped to `1..=MAX_PER_PAGE`.
    pub fn normalize(self) -> (u64, u64) {
        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        ((page - 1) as u64, per_page as u64)
    }

    pub fn skip(self) -> u64 {
        let (idx, per_page) = self.normalize();
        idx * per_page
    }

    pub fn take(self) -> u64 {
        self.normalize().1
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

/// One page of rows plus the size of the whole filtered set.
#[derive(Clone, Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Paged<T> {
    pub(crate) fn new(items: Vec<T>, total: u64, p: Pagination) -> Self {
        let (idx, per_page) = p.normalize();
        Self { items, total, page: idx as u32 + 1, per_page: per_page as u32 }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page.max(1) as u64)
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_oversized_requests_are_clamped() {
        assert_eq!(Pagination::new(0, 0).normalize(), (0, 1));
        let p = Pagination::new(5, 1000);
        assert_eq!(p.normalize(), (4, 100));
        assert_eq!(p.skip(), 400);
        assert_eq!(p.take(), 100);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let p: Pagination = serde_json::from_str(r#"{"page": 3}"#).unwrap();
        assert_eq!(p, Pagination::new(3, 20));
    }

    #[test]
    fn page_counts() {
        let page: Paged<u8> = Paged::new(vec![1, 2], 41, Pagination::new(0, 20));
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());

        let last: Paged<u8> = Paged::new(vec![], 40, Pagination::new(2, 20));
        assert!(!last.has_next());
    }
}
