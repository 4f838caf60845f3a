//! Outbound adapters implementing the domain repository ports.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM.
//! - **memory**: mutex-guarded in-memory repositories with the same contract.
//!
//! Adapters translate between domain aggregates and store representations.
//! They contain no business logic.

pub mod memory;
pub mod persistence;
