//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the user and group repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   aggregates. Cross-aggregate checks live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Deadlines**: every operation runs under the pool's query timeout and
//!   reports expiry as a cancellation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use user_management::domain::RecordKeyGenerator;
//! use user_management::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/users")).await?;
//! let users = DieselUserRepository::new(pool, Arc::new(RecordKeyGenerator::default()));
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_group_repository;
mod diesel_helpers;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAX_SIZE, DEFAULT_MIN_IDLE, DEFAULT_QUERY_TIMEOUT, DbPool,
    PoolConfig, PoolError,
};
