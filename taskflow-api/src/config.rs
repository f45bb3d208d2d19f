/// Configuration management for the API server
///
/// Loads configuration from environment variables into a typed struct at
/// startup; nothing reads the environment after `from_env` returns.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `JWT_SECRET`: access-token signing key (required, >= 32 bytes)
/// - `REFRESH_TOKEN_SECRET`: refresh-token signing key (required, >= 32
///   bytes, must differ from `JWT_SECRET`)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: `*`, which
///   reflects the request origin)

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` reflects the request origin
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// JWT configuration
///
/// Access and refresh tokens use separate keys so a leaked access key
/// cannot forge refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Access-token signing key
    pub access_secret: String,

    /// Refresh-token signing key
    pub refresh_secret: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing, a numeric
    /// variable fails to parse, or the secrets fail [`validate_secrets`].
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env if present (development convenience)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let access_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        let refresh_secret = env::var("REFRESH_TOKEN_SECRET").map_err(|_| {
            anyhow::anyhow!("REFRESH_TOKEN_SECRET environment variable is required")
        })?;

        validate_secrets(&access_secret, &refresh_secret)?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            jwt: JwtConfig {
                access_secret,
                refresh_secret,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Checks both signing keys are long enough and distinct
pub fn validate_secrets(access_secret: &str, refresh_secret: &str) -> anyhow::Result<()> {
    if access_secret.len() < 32 {
        anyhow::bail!("JWT_SECRET must be at least 32 characters long");
    }
    if refresh_secret.len() < 32 {
        anyhow::bail!("REFRESH_TOKEN_SECRET must be at least 32 characters long");
    }
    if access_secret == refresh_secret {
        anyhow::bail!("JWT_SECRET and REFRESH_TOKEN_SECRET must be different keys");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                access_secret: "access-secret-for-tests-32-bytes!".to_string(),
                refresh_secret: "refresh-secret-for-tests-32-byte!".to_string(),
            },
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_validate_secrets_length() {
        assert!(validate_secrets("short", "refresh-secret-for-tests-32-byte!").is_err());
        assert!(validate_secrets("access-secret-for-tests-32-bytes!", "short").is_err());
    }

    #[test]
    fn test_validate_secrets_must_differ() {
        let same = "one-secret-used-for-both-token-classes";
        assert!(validate_secrets(same, same).is_err());

        assert!(validate_secrets(
            "access-secret-for-tests-32-bytes!",
            "refresh-secret-for-tests-32-byte!"
        )
        .is_ok());
    }
}
