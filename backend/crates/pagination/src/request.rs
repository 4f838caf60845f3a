//! 1-based page requests and their validation.

use serde::Serialize;
use thiserror::Error;

use crate::OffsetWindow;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u64 = 100;

/// Errors raised when constructing a [`PageRequest`] strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// The requested page size is outside `1..=MAX_PER_PAGE`.
    #[error("per_page must be between 1 and {max}, got {per_page}")]
    PerPageOutOfRange {
        /// Requested page size.
        per_page: u64,
        /// Largest accepted page size.
        max: u64,
    },
}

/// A validated 1-based page request.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= per_page <= MAX_PER_PAGE`
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 20).expect("valid page request");
/// let window = request.window();
/// assert_eq!(window.offset(), 40);
/// assert_eq!(window.limit(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    /// Validate a page request, rejecting out-of-range input.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::ZeroPage`] for page `0` and
    /// [`PageRequestError::PerPageOutOfRange`] when `per_page` is `0` or larger
    /// than [`MAX_PER_PAGE`].
    pub const fn new(page: u64, per_page: u64) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(PageRequestError::PerPageOutOfRange {
                per_page,
                max: MAX_PER_PAGE,
            });
        }
        Ok(Self { page, per_page })
    }

    /// Build a page request from untrusted input, forcing it into range.
    ///
    /// Page `0` becomes page `1`; `per_page` is clamped to
    /// `1..=MAX_PER_PAGE`.
    #[must_use]
    pub const fn clamped(page: u64, per_page: u64) -> Self {
        let clamped_page = if page == 0 { 1 } else { page };
        let clamped_per_page = if per_page == 0 {
            1
        } else if per_page > MAX_PER_PAGE {
            MAX_PER_PAGE
        } else {
            per_page
        };
        Self {
            page: clamped_page,
            per_page: clamped_per_page,
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Zero-based offset window handed to repositories.
    ///
    /// Offsets that would overflow saturate at `u64::MAX`; the store decides
    /// what an unreachable offset yields.
    #[must_use]
    pub const fn window(&self) -> OffsetWindow {
        let offset = self.page.saturating_sub(1).saturating_mul(self.per_page);
        OffsetWindow::new(offset, self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}
