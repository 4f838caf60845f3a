//! Page metadata and the envelope returned to callers.

use serde::Serialize;

use crate::PageRequest;

/// Pagination metadata reported alongside a page of results.
///
/// `total` comes from a separate count query, so it may drift from the
/// returned items under concurrent writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Page size used for this request.
    pub per_page: u64,
    /// 1-based page number of this page.
    pub page: u64,
    /// Number of pages needed to cover `total`.
    pub total_pages: u64,
}

impl PageMeta {
    /// Derive metadata for `request` given the total item count.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageMeta, PageRequest};
    ///
    /// let meta = PageMeta::new(PageRequest::new(1, 10).expect("valid"), 21);
    /// assert_eq!(meta.total_pages, 3);
    /// ```
    #[must_use]
    pub const fn new(request: PageRequest, total: u64) -> Self {
        Self {
            total,
            per_page: request.per_page(),
            page: request.page(),
            total_pages: total.div_ceil(request.per_page()),
        }
    }

    /// Whether a page exists after this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// A page of items plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    data: Vec<T>,
    meta: PageMeta,
}

impl<T> Page<T> {
    /// Wrap `data` fetched for `request` with a total of `total` items.
    #[must_use]
    pub const fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            meta: PageMeta::new(request, total),
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Metadata describing this page.
    #[must_use]
    pub const fn meta(&self) -> &PageMeta {
        &self.meta
    }

    /// Transform the items while keeping the metadata.
    #[must_use]
    pub fn map<U>(self, transform: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(transform).collect(),
            meta: self.meta,
        }
    }

    /// Split the page into its items and metadata.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, PageMeta) {
        (self.data, self.meta)
    }
}
