//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use duel_coordinator::db::DatabaseConfig;
use std::{fmt, net::SocketAddr, str::FromStr};

const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Where tournaments, registrations and matches are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory, lost on restart
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(ConfigError::Invalid {
                var: "STORAGE_BACKEND".to_string(),
                reason: format!("unknown backend '{other}', expected memory or postgres"),
            }),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres => "postgres",
        })
    }
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    pub storage: StorageBackend,
    /// Used when `storage` is `Postgres`
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    /// Prometheus scrape endpoint, disabled when `None`
    pub metrics_bind: Option<SocketAddr>,
    /// Frames buffered per WebSocket before pushes are dropped
    pub outbound_buffer: usize,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// CLI overrides take precedence over the environment.
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        storage_override: Option<StorageBackend>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 6969))),
        };

        let storage = match storage_override {
            Some(storage) => storage,
            None => match std::env::var("STORAGE_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => StorageBackend::Memory,
            },
        };

        let database_url = database_url_override
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| DatabaseConfig::development().database_url);
        let database =
            DatabaseConfig::with_url(database_url).map_err(|e| ConfigError::Invalid {
                var: "DB_*".to_string(),
                reason: e.to_string(),
            })?;

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        Ok(ServerConfig {
            bind,
            storage,
            database,
            security: SecurityConfig { jwt_secret },
            metrics_bind: parse_env("METRICS_BIND")?,
            outbound_buffer: parse_env("OUTBOUND_BUFFER")?.unwrap_or(32),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.outbound_buffer == 0 {
            return Err(ConfigError::Invalid {
                var: "OUTBOUND_BUFFER".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        if self.storage == StorageBackend::Postgres
            && !self.database.database_url.starts_with("postgres")
        {
            return Err(ConfigError::Invalid {
                var: "DATABASE_URL".to_string(),
                reason: "Must be a postgres:// connection string".to_string(),
            });
        }

        Ok(())
    }

    /// Default bind address as text, for help output
    pub fn default_bind() -> &'static str {
        DEFAULT_BIND
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional environment variable, rejecting unparsable values
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("cannot parse '{value}'"),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            storage: StorageBackend::Memory,
            database: DatabaseConfig::development(),
            security: SecurityConfig {
                jwt_secret: "a".repeat(32),
            },
            metrics_bind: None,
            outbound_buffer: 32,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let mut config = config();
        config.security.jwt_secret = "short".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Invalid { .. }
        ));
    }

    #[test]
    fn test_zero_buffer_is_rejected() {
        let mut config = config();
        config.outbound_buffer = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metrics_cannot_share_server_port() {
        let mut config = config();
        config.metrics_bind = Some(config.bind);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(
            "Postgres".parse::<StorageBackend>().unwrap(),
            StorageBackend::Postgres
        );
        assert_eq!(
            "memory".parse::<StorageBackend>().unwrap(),
            StorageBackend::Memory
        );
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_requires_jwt_secret() {
        // SAFETY: serialized with the other environment tests
        unsafe {
            std::env::remove_var("JWT_SECRET");
        }
        let err = ServerConfig::from_env(None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    #[serial]
    fn test_from_env_with_overrides() {
        // SAFETY: serialized with the other environment tests
        unsafe {
            std::env::set_var("JWT_SECRET", "s".repeat(40));
            std::env::set_var("OUTBOUND_BUFFER", "8");
        }
        let config = ServerConfig::from_env(
            Some("0.0.0.0:7000".parse().unwrap()),
            Some("postgres://test@localhost/test".to_string()),
            Some(StorageBackend::Postgres),
        )
        .unwrap();
        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("OUTBOUND_BUFFER");
        }

        assert_eq!(config.bind.port(), 7000);
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.database.database_url, "postgres://test@localhost/test");
        assert_eq!(config.outbound_buffer, 8);
        assert!(config.validate().is_ok());
    }
}
