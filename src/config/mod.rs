use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Default route matcher: everything except API routes, framework static/image assets and PNG files
pub const DEFAULT_ROUTE_MATCHER: &str = r"/((?!api|_next/static|_next/image|.*\.png$).*)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub invoices: InvoiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string, read from POSTGRES_URL
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub require_ssl: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub session_secret: String,
    pub session_cookie: String,
    pub session_expiry_hours: u64,
    pub login_path: String,
    pub protected_prefix: String,
    pub route_matcher: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceConfig {
    /// Cached listing view that is revalidated and navigated to after a mutation
    pub listing_path: String,
    pub delete_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("POSTGRES_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_REQUIRE_SSL") {
            self.database.require_ssl = v.parse().unwrap_or(self.database.require_ssl);
        }

        // Security overrides
        if let Ok(v) = env::var("AUTH_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_SESSION_COOKIE") {
            self.security.session_cookie = v;
        }
        if let Ok(v) = env::var("SECURITY_SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_LOGIN_PATH") {
            self.security.login_path = v;
        }
        if let Ok(v) = env::var("SECURITY_PROTECTED_PREFIX") {
            self.security.protected_prefix = v;
        }
        if let Ok(v) = env::var("SECURITY_ROUTE_MATCHER") {
            self.security.route_matcher = v;
        }

        // Invoice overrides
        if let Ok(v) = env::var("INVOICES_LISTING_PATH") {
            self.invoices.listing_path = v;
        }
        if let Ok(v) = env::var("INVOICES_DELETE_ENABLED") {
            self.invoices.delete_enabled = v.parse().unwrap_or(self.invoices.delete_enabled);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                require_ssl: false,
            },
            security: SecurityConfig::defaults(24 * 7), // 1 week
            invoices: InvoiceConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                require_ssl: true,
            },
            security: SecurityConfig::defaults(24),
            invoices: InvoiceConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                require_ssl: true,
            },
            security: SecurityConfig::defaults(8),
            invoices: InvoiceConfig::default(),
        }
    }
}

impl SecurityConfig {
    fn defaults(session_expiry_hours: u64) -> Self {
        Self {
            session_secret: String::new(),
            session_cookie: "session".to_string(),
            session_expiry_hours,
            login_path: "/login".to_string(),
            protected_prefix: "/dashboard".to_string(),
            route_matcher: DEFAULT_ROUTE_MATCHER.to_string(),
        }
    }
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            listing_path: "/dashboard/invoices".to_string(),
            delete_enabled: false,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.database.require_ssl);
        assert_eq!(config.server.port, 3000);
        assert!(!config.invoices.delete_enabled);
        assert_eq!(config.security.route_matcher, DEFAULT_ROUTE_MATCHER);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.database.require_ssl);
        assert_eq!(config.security.session_expiry_hours, 8);
        assert_eq!(config.invoices.listing_path, "/dashboard/invoices");
        assert!(config.database.url.is_none());
    }
}
