//! Store settings loaded via OrthoConfig.
//!
//! Values come from `USER_MANAGEMENT_*` environment variables, configuration
//! files, or CLI arguments, in OrthoConfig's usual precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

/// Connection settings for the PostgreSQL store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_MANAGEMENT")]
pub struct StoreSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    #[ortho_config(default = 10)]
    pub max_connections: u32,
    /// Idle connections kept open.
    #[ortho_config(default = 2)]
    pub min_idle: u32,
    /// Pool checkout timeout in seconds.
    #[ortho_config(default = 30)]
    pub connect_timeout_secs: u64,
    /// Deadline for a single repository operation in milliseconds.
    #[ortho_config(default = 5000)]
    pub query_timeout_ms: u64,
}

/// Raised when no database URL is configured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no database URL configured; set USER_MANAGEMENT_DATABASE_URL or pass --database-url")]
pub struct MissingDatabaseUrl;

impl StoreSettings {
    /// Build a pool configuration, preferring `override_url` when given.
    ///
    /// `min_idle` is capped at `max_connections`, so lowering only the
    /// connection limit still yields a usable pool.
    pub fn pool_config(&self, override_url: Option<&str>) -> Result<PoolConfig, MissingDatabaseUrl> {
        let url = override_url
            .or(self.database_url.as_deref())
            .ok_or(MissingDatabaseUrl)?;
        Ok(PoolConfig::new(url)
            .with_max_size(self.max_connections)
            .with_min_idle(Some(self.min_idle.min(self.max_connections)))
            .with_connection_timeout(Duration::from_secs(self.connect_timeout_secs))
            .with_query_timeout(Duration::from_millis(self.query_timeout_ms)))
    }
}
