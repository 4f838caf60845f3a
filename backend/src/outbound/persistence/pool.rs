//! bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! The pool also carries the per-operation deadline, so every repository
//! sharing a pool applies the same limit to its store round-trips.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Pool construction and checkout failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available within the checkout timeout.
    #[error("connection checkout failed: {message}")]
    Checkout { message: String },
    /// bb8 refused to build the pool.
    #[error("pool construction failed: {message}")]
    Build { message: String },
    /// Limits that could never yield a working pool.
    #[error("invalid pool settings: {message}")]
    InvalidSettings { message: String },
}

impl PoolError {
    /// Checkout failure carrying bb8's message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Pool construction failure carrying bb8's message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Settings rejected by [`PoolConfig::validate`].
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }
}

/// Default upper bound on pooled connections.
pub const DEFAULT_MAX_SIZE: u32 = 10;
/// Default number of idle connections kept open.
pub const DEFAULT_MIN_IDLE: u32 = 2;
/// Default checkout timeout.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
/// Default deadline for one repository operation.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection target, pool limits and operation deadline.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use user_management::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://app@localhost/users")
///     .with_max_size(4)
///     .with_query_timeout(Duration::from_millis(750));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.query_timeout(), Duration::from_millis(750));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
    query_timeout: Duration,
}

impl PoolConfig {
    /// Target `database_url` with the default limits.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            min_idle: Some(DEFAULT_MIN_IDLE),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Upper bound on pooled connections.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Idle connections to keep open; `None` lets bb8 decide.
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// How long a checkout may wait for a connection.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Deadline applied to each repository operation.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// PostgreSQL connection URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Idle connections bb8 keeps open, if any.
    pub fn min_idle(&self) -> Option<u32> {
        self.min_idle
    }

    /// Deadline applied to each repository operation.
    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Reject limits bb8 would accept but that can never serve a query.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_size == 0 {
            return Err(PoolError::invalid_settings("max_size must be at least 1"));
        }
        if self.min_idle.is_some_and(|idle| idle > self.max_size) {
            return Err(PoolError::invalid_settings(format!(
                "min_idle must not exceed max_size ({})",
                self.max_size
            )));
        }
        if self.connection_timeout.is_zero() || self.query_timeout.is_zero() {
            return Err(PoolError::invalid_settings("timeouts must be non-zero"));
        }
        Ok(())
    }
}

/// Shared handle to the connection pool. Cloning is cheap.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
    query_timeout: Duration,
}

impl DbPool {
    /// Validate `config` and build the pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidSettings`] for unusable limits and
    /// [`PoolError::Build`] when bb8 cannot open the initial connections.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self {
            inner,
            query_timeout: config.query_timeout,
        })
    }

    /// Check out a connection.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }

    /// Deadline shared by every repository built on this pool.
    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_are_applied() {
        let config = PoolConfig::new("postgres://localhost/users");

        assert_eq!(config.database_url(), "postgres://localhost/users");
        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.min_idle, Some(DEFAULT_MIN_IDLE));
        assert_eq!(config.connection_timeout, DEFAULT_CONNECTION_TIMEOUT);
        assert_eq!(config.query_timeout(), DEFAULT_QUERY_TIMEOUT);
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest]
    #[case(PoolConfig::new("postgres://x/y").with_max_size(0), "max_size")]
    #[case(
        PoolConfig::new("postgres://x/y").with_max_size(2).with_min_idle(Some(3)),
        "min_idle"
    )]
    #[case(
        PoolConfig::new("postgres://x/y").with_query_timeout(Duration::ZERO),
        "timeouts"
    )]
    #[case(
        PoolConfig::new("postgres://x/y").with_connection_timeout(Duration::ZERO),
        "timeouts"
    )]
    fn unusable_limits_are_rejected(#[case] config: PoolConfig, #[case] fragment: &str) {
        let err = config.validate().expect_err("limits rejected");
        assert!(matches!(err, PoolError::InvalidSettings { .. }));
        assert!(err.to_string().contains(fragment), "{err}");
    }

    #[rstest]
    fn absent_min_idle_is_allowed() {
        let config = PoolConfig::new("postgres://x/y")
            .with_max_size(1)
            .with_min_idle(None);
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest]
    #[tokio::test]
    async fn new_validates_before_connecting() {
        let result = DbPool::new(PoolConfig::new("postgres://unreachable/db").with_max_size(0)).await;
        assert!(matches!(result, Err(PoolError::InvalidSettings { .. })));
    }
}
