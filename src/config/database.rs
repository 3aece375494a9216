//! PostgreSQL pool configuration.

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ValidationError;

/// The billing service is a small, low-traffic API; anything beyond this
/// pool size points at a connection leak rather than real load.
const MAX_POOL_SIZE: u32 = 50;

/// Connection pool configuration for the subscriptions store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,

    /// Connections the pool keeps warm.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Upper bound on open connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a request may wait for a connection, in seconds.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle time before a connection is closed, in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Builds pool options carrying every tuning knob from this config.
    ///
    /// The caller connects with `pool_options().connect(&config.url)`.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE_URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections == 0 || self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

fn default_min_connections() -> u32 {
    2
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    15
}

fn default_idle_timeout() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "postgresql://billing@localhost:5432/fleetflow".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_size_the_pool_conservatively() {
        let config = DatabaseConfig::default();
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn pool_options_carry_connection_bounds() {
        let config = DatabaseConfig {
            max_connections: 7,
            ..valid_config()
        };
        let options = config.pool_options();
        assert_eq!(options.get_max_connections(), 7);
    }

    #[test]
    fn validation_requires_url() {
        assert!(matches!(
            DatabaseConfig::default().validate(),
            Err(ValidationError::MissingRequired("DATABASE_URL"))
        ));
    }

    #[test]
    fn validation_rejects_non_postgres_scheme() {
        let config = DatabaseConfig {
            url: "mysql://localhost/fleetflow".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn validation_rejects_inverted_pool_bounds() {
        let config = DatabaseConfig {
            min_connections: 10,
            max_connections: 5,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_oversized_pool() {
        let config = DatabaseConfig {
            max_connections: 200,
            min_connections: 1,
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::PoolSizeTooLarge)
        ));
    }

    #[test]
    fn validation_accepts_typical_config() {
        assert!(valid_config().validate().is_ok());
    }
}
