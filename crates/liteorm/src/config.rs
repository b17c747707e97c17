//! Connection configuration.

use std::env;
use std::time::Duration;

/// Environment variable read by [`DaoConfig::from_env`].
pub const DATABASE_ENV: &str = "LITEORM_DATABASE";

/// In-memory database path.
pub const MEMORY: &str = ":memory:";

/// Configuration for opening a [`Dao`](crate::Dao) over SQLite.
#[derive(Debug, Clone)]
pub struct DaoConfig {
    /// Database file path, or `:memory:`.
    pub path: String,
    /// Enforce foreign-key constraints (`PRAGMA foreign_keys = ON`).
    pub foreign_keys: bool,
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout: Option<Duration>,
    /// Truncate logged SQL (in chars). `None` means no truncation.
    pub max_sql_log_length: Option<usize>,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            path: MEMORY.to_string(),
            foreign_keys: true,
            busy_timeout: None,
            max_sql_log_length: Some(200),
        }
    }
}

impl DaoConfig {
    /// Create a new configuration with defaults (in-memory database).
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the database path from `LITEORM_DATABASE`, falling back to `:memory:`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = env::var(DATABASE_ENV) {
            if !path.trim().is_empty() {
                config.path = path;
            }
        }
        config
    }

    /// Set the database path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Enable or disable foreign-key enforcement.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Set the busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_log_length(mut self, len: usize) -> Self {
        self.max_sql_log_length = Some(len);
        self
    }

    /// Log SQL untruncated.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_log_length = None;
        self
    }

    pub fn is_memory(&self) -> bool {
        self.path == MEMORY
    }
}
