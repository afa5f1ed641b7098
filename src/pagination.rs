//! Page-index arithmetic for the result list.

use serde::{Deserialize, Serialize};

/// Where a page sits in the full result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number after clamping.
    pub page: usize,
    /// Items per page.
    pub page_size: usize,
    /// Total items across all pages.
    pub total: usize,
    /// Number of pages; 0 when there are no items.
    pub total_pages: usize,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
}

impl PageInfo {
    /// Compute the page window for `requested` page of `total` items.
    ///
    /// `page_size` below 1 is treated as 1. The page is clamped to
    /// `1..=total_pages`; with no items it is 1 and neither direction is
    /// available.
    pub fn new(total: usize, page_size: usize, requested: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size);
        let page = requested.clamp(1, total_pages.max(1));

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }

    /// Index range of this page's items within the full list.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    /// This page's slice of `items`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }
}
