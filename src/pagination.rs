//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 1000,
        }
    }
}

/// A resolved page request: a 1-based page number and a page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of items on the page.
    pub limit: u64,
}

impl Pagination {
    /// The number of items that come before this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl PaginationConfig {
    /// Resolve the page and page size requested by a client.
    ///
    /// Missing values use the defaults, a page of zero is treated as the first
    /// page, and page sizes are clamped to `1..=max_page_size`.
    pub fn resolve(&self, page: Option<u64>, limit: Option<u64>) -> Pagination {
        let page = page.unwrap_or(self.default_page).max(1);
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1));

        Pagination { page, limit }
    }
}
