/// Configuration management for the portfolio service.
///
/// Loads configuration from environment variables, with production
/// hardening checks applied at load time rather than at first use.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication / session settings
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Login entry point unauthenticated clients are redirected to
    pub login_path: String,
    /// Consecutive failed logins before the account locks
    pub max_failed_logins: i32,
    /// Lockout duration once the threshold is reached
    pub lockout_minutes: i64,
    /// Session lifetime
    pub session_ttl_days: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("PORTFOLIO_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PORTFOLIO_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8084),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/vantage".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            auth: AuthConfig {
                login_path: std::env::var("AUTH_LOGIN_PATH")
                    .unwrap_or_else(|_| "/login".to_string()),
                max_failed_logins: std::env::var("AUTH_MAX_FAILED_LOGINS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                lockout_minutes: std::env::var("AUTH_LOCKOUT_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
                session_ttl_days: std::env::var("AUTH_SESSION_TTL_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        for key in [
            "APP_ENV",
            "PORTFOLIO_SERVICE_HOST",
            "PORTFOLIO_SERVICE_PORT",
            "CORS_ALLOWED_ORIGINS",
            "DATABASE_URL",
            "DATABASE_MAX_CONNECTIONS",
            "AUTH_LOGIN_PATH",
            "AUTH_MAX_FAILED_LOGINS",
            "AUTH_LOCKOUT_MINUTES",
            "AUTH_SESSION_TTL_DAYS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial_test::serial]
    fn development_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 8084);
        assert_eq!(config.cors.allowed_origins, "http://localhost:3000");
        assert_eq!(config.auth.login_path, "/login");
        assert_eq!(config.auth.max_failed_logins, 5);
        assert_eq!(config.auth.lockout_minutes, 15);
    }

    #[test]
    #[serial_test::serial]
    fn production_requires_explicit_cors() {
        clear_env();
        std::env::set_var("APP_ENV", "production");

        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://app.vantage.dev");
        let config = Config::from_env().unwrap();
        assert_eq!(config.cors.allowed_origins, "https://app.vantage.dev");

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn env_overrides_are_honored() {
        clear_env();
        std::env::set_var("PORTFOLIO_SERVICE_PORT", "9090");
        std::env::set_var("AUTH_MAX_FAILED_LOGINS", "3");
        std::env::set_var("AUTH_LOCKOUT_MINUTES", "60");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.port, 9090);
        assert_eq!(config.auth.max_failed_logins, 3);
        assert_eq!(config.auth.lockout_minutes, 60);

        clear_env();
    }
}
