//! Zero-based offset/limit window consumed by repositories.

use serde::Serialize;

/// Offset and limit passed verbatim to a repository query.
///
/// Unlike [`crate::PageRequest`] a window carries no range guarantees beyond
/// non-negativity; repositories forward it to the store unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OffsetWindow {
    offset: u64,
    limit: u64,
}

impl OffsetWindow {
    /// Create a window skipping `offset` rows and returning at most `limit`.
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Maximum number of rows to return.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }
}
