//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use axum::http::HeaderValue;
use research_desk::{auth::HashCost, db::DatabaseConfig};
use std::{fmt, net::SocketAddr};

/// Default listen port when neither `SERVER_BIND` nor `PORT` is set
pub const DEFAULT_PORT: u16 = 5000;

/// Longest accepted session token lifetime (one year)
pub const MAX_TOKEN_VALIDITY_HOURS: i64 = 24 * 366;

/// Origins of the web frontend allowed by default
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:8080", "http://127.0.0.1:8080"];

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Cross-origin policy
    pub cors: CorsConfig,
    /// Prometheus listener address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Session token lifetime in hours
    pub token_validity_hours: i64,
    /// Argon2 cost parameters
    pub hash_cost: HashCost,
}

impl SecurityConfig {
    /// Token lifetime; out-of-range hour counts saturate instead of panicking.
    pub fn token_validity(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.token_validity_hours)
            .unwrap_or(chrono::Duration::hours(MAX_TOKEN_VALIDITY_HOURS))
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_validity_hours", &self.token_validity_hours)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, PartialEq)]
pub struct CorsConfig {
    allowed_origins: Vec<HeaderValue>,
}

impl CorsConfig {
    /// Build from a list of origins such as `http://localhost:8080`.
    pub fn new<'a>(origins: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        let allowed_origins = origins
            .into_iter()
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        var: "CORS_ALLOWED_ORIGINS".to_string(),
                        reason: format!("Origin '{origin}' must start with http:// or https://"),
                    });
                }
                HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|_| {
                    ConfigError::Invalid {
                        var: "CORS_ALLOWED_ORIGINS".to_string(),
                        reason: format!("Origin '{origin}' is not a valid header value"),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if allowed_origins.is_empty() {
            return Err(ConfigError::Invalid {
                var: "CORS_ALLOWED_ORIGINS".to_string(),
                reason: "At least one origin is required".to_string(),
            });
        }

        Ok(Self { allowed_origins })
    }

    pub fn allowed_origins(&self) -> &[HeaderValue] {
        &self.allowed_origins
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_CORS_ORIGINS
                .into_iter()
                .map(HeaderValue::from_static)
                .collect(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            bind_override,
            database_url_override,
        )
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Bind address: SERVER_BIND wins over PORT
        let bind = match bind_override {
            Some(bind) => bind,
            None => match (lookup("SERVER_BIND"), lookup("PORT")) {
                (Some(bind), _) => bind.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{bind}' is not an IP:PORT address"),
                })?,
                (None, Some(port)) => {
                    let port: u16 = port.parse().map_err(|_| ConfigError::Invalid {
                        var: "PORT".to_string(),
                        reason: format!("'{port}' is not a port number"),
                    })?;
                    SocketAddr::from(([127, 0, 0, 1], port))
                }
                (None, None) => SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            },
        };

        // Database configuration
        let defaults = DatabaseConfig::development();
        let database_url = database_url_override
            .or_else(|| lookup("DATABASE_URL"))
            .or_else(|| lookup("POSTGRES_URI"))
            .unwrap_or(defaults.database_url);

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", defaults.min_connections),
            connection_timeout_secs: parse_or(
                &lookup,
                "DB_CONNECTION_TIMEOUT_SECS",
                defaults.connection_timeout_secs,
            ),
            idle_timeout_secs: parse_or(&lookup, "DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            max_lifetime_secs: parse_or(&lookup, "DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
        };

        // Security configuration (REQUIRED)
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let default_cost = HashCost::default();
        let security = SecurityConfig {
            jwt_secret,
            token_validity_hours: parse_or(&lookup, "TOKEN_VALIDITY_HOURS", 24),
            hash_cost: HashCost {
                memory_kib: parse_or(&lookup, "PASSWORD_HASH_MEMORY_KIB", default_cost.memory_kib),
                iterations: parse_or(&lookup, "PASSWORD_HASH_ITERATIONS", default_cost.iterations),
                parallelism: parse_or(
                    &lookup,
                    "PASSWORD_HASH_PARALLELISM",
                    default_cost.parallelism,
                ),
            },
        };

        let cors = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(origins) => CorsConfig::new(origins.split(','))?,
            None => CorsConfig::default(),
        };

        let metrics_bind = lookup("METRICS_BIND")
            .map(|addr| {
                addr.parse().map_err(|_| ConfigError::Invalid {
                    var: "METRICS_BIND".to_string(),
                    reason: format!("'{addr}' is not an IP:PORT address"),
                })
            })
            .transpose()?;

        Ok(ServerConfig {
            bind,
            database,
            security,
            cors,
            metrics_bind,
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

        if self.security.token_validity_hours <= 0 {
            return Err(ConfigError::Invalid {
                var: "TOKEN_VALIDITY_HOURS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.security.token_validity_hours > MAX_TOKEN_VALIDITY_HOURS {
            return Err(ConfigError::Invalid {
                var: "TOKEN_VALIDITY_HOURS".to_string(),
                reason: format!("Must be at most {MAX_TOKEN_VALIDITY_HOURS} (one year)"),
            });
        }

        let cost = &self.security.hash_cost;
        if cost.iterations == 0 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_HASH_ITERATIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if cost.parallelism == 0 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_HASH_PARALLELISM".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        // Argon2 needs at least 8 KiB per lane
        if cost.memory_kib < 8 * cost.parallelism {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_HASH_MEMORY_KIB".to_string(),
                reason: format!("Must be at least {} (8 KiB per lane)", 8 * cost.parallelism),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
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

/// Helper to parse a variable with default fallback
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned(), None, None)
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
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.security.token_validity_hours, 24);
        assert_eq!(config.security.hash_cost, HashCost::default());
        assert_eq!(config.cors, CorsConfig::default());
        assert!(config.metrics_bind.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_jwt_secret() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let config = load(&[("JWT_SECRET", "short")]).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_token_validity_bounds() {
        let config = load(&[("JWT_SECRET", SECRET), ("TOKEN_VALIDITY_HOURS", "8784")]).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.security.token_validity(), chrono::Duration::hours(8784));

        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("TOKEN_VALIDITY_HOURS", "9223372036854775807"),
        ])
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref var, .. }) if var == "TOKEN_VALIDITY_HOURS"
        ));
        // Does not panic even when validation was skipped
        assert_eq!(
            config.security.token_validity(),
            chrono::Duration::hours(MAX_TOKEN_VALIDITY_HOURS)
        );
    }

    #[test]
    fn test_port_and_bind() {
        let config = load(&[("JWT_SECRET", SECRET), ("PORT", "6000")]).unwrap();
        assert_eq!(config.bind, "127.0.0.1:6000".parse().unwrap());

        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("PORT", "6000"),
            ("SERVER_BIND", "0.0.0.0:7000"),
        ])
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:7000".parse().unwrap());

        assert!(load(&[("JWT_SECRET", SECRET), ("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("JWT_SECRET", SECRET), ("POSTGRES_URI", "postgres://legacy/db")])
            .unwrap();
        assert_eq!(config.database.database_url, "postgres://legacy/db");

        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("POSTGRES_URI", "postgres://legacy/db"),
            ("DATABASE_URL", "postgres://primary/db"),
        ])
        .unwrap();
        assert_eq!(config.database.database_url, "postgres://primary/db");
    }

    #[test]
    fn test_cors_origins_parsed() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            (
                "CORS_ALLOWED_ORIGINS",
                "https://desk.example.com, http://localhost:3000/",
            ),
        ])
        .unwrap();

        assert_eq!(
            config.cors.allowed_origins(),
            &[
                HeaderValue::from_static("https://desk.example.com"),
                HeaderValue::from_static("http://localhost:3000"),
            ]
        );
    }

    #[test]
    fn test_cors_origins_rejected() {
        assert!(CorsConfig::new(["localhost:8080"]).is_err());
        assert!(CorsConfig::new([" ", ""]).is_err());
    }

    #[test]
    fn test_hash_cost_validation() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("PASSWORD_HASH_MEMORY_KIB", "8"),
            ("PASSWORD_HASH_PARALLELISM", "2"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_security_debug_redacts_secret() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();
        let debug = format!("{:?}", config.security);
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("<redacted>"));
    }
}
