//! User and group management: domain, ports, and store adapters.
//!
//! The domain layer owns the aggregates, the identity codec, and the
//! use-case services. Outbound adapters implement the repository ports
//! against PostgreSQL or an in-memory store.

pub mod config;
pub mod domain;
pub mod outbound;
