//! Database configuration module.

use std::env;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Create configuration from environment variables.
    ///
    /// An explicit `database_url` (e.g. from a CLI flag) takes precedence
    /// over the environment.
    ///
    /// Expected environment variables:
    /// - `DATABASE_URL`: PostgreSQL connection string (required unless a URL
    ///   is passed in)
    /// - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 20)
    /// - `DB_MIN_CONNECTIONS`: Minimum pool size (default: 5)
    /// - `DB_CONNECTION_TIMEOUT_SECS`: Connection timeout in seconds (default: 10)
    /// - `DB_IDLE_TIMEOUT_SECS`: Idle timeout in seconds (default: 600)
    /// - `DB_MAX_LIFETIME_SECS`: Max lifetime in seconds (default: 1800)
    ///
    /// # Errors
    ///
    /// Returns `env::VarError` if no URL is passed and `DATABASE_URL` is not
    /// set.
    pub fn from_env(database_url: Option<String>) -> Result<Self, env::VarError> {
        let database_url = match database_url {
            Some(url) => url,
            None => env::var("DATABASE_URL")?,
        };
        Ok(Self {
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 5),
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT_SECS", 10),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", 600),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", 1800),
        })
    }

    /// Configuration with pool defaults for a given connection URL
    pub fn with_url(database_url: String) -> Self {
        Self {
            database_url,
            max_connections: 20,
            min_connections: 5,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_url_applies_pool_defaults() {
        let config = DatabaseConfig::with_url("postgres://localhost/auth_test".to_string());
        assert_eq!(config.database_url, "postgres://localhost/auth_test");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
    }

    #[test]
    fn from_env_prefers_explicit_url() {
        let config = DatabaseConfig::from_env(Some("postgres://localhost/override".to_string()))
            .expect("explicit URL needs no environment");
        assert_eq!(config.database_url, "postgres://localhost/override");
    }
}
