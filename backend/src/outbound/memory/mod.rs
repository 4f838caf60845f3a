//! In-memory repository adapters.
//!
//! These satisfy the same port contracts as the Diesel adapters, including
//! identifier validation and atomic membership updates, without a database.
//! Records are kept in insertion order, which is the store order reported by
//! `list` and `search`.

mod group_repository;
mod user_repository;

pub use group_repository::InMemoryGroupRepository;
pub use user_repository::InMemoryUserRepository;

fn window_bounds(len: usize, offset: u64, limit: u64) -> (usize, usize) {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    (start, take)
}
