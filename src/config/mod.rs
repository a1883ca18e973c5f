use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding avatar uploads
    pub bucket: String,
    /// Base URL of the storage backend, used for signed and public object URLs
    pub public_base_url: String,
    /// Lifetime of minted signed upload URLs
    pub signed_url_ttl_secs: u64,
    /// Secret used to sign upload tokens
    pub signing_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Secret the external identity provider signs session tokens with
    pub identity_jwt_secret: String,
    pub enable_cors: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Ok(v) = env::var("STORAGE_PUBLIC_URL") {
            self.storage.public_base_url = v;
        }
        if let Ok(v) = env::var("STORAGE_SIGNED_URL_TTL_SECS") {
            self.storage.signed_url_ttl_secs =
                v.parse().unwrap_or(self.storage.signed_url_ttl_secs);
        }
        if let Ok(v) = env::var("STORAGE_SIGNING_SECRET") {
            self.storage.signing_secret = v;
        }

        // Security overrides
        if let Ok(v) = env::var("IDENTITY_JWT_SECRET") {
            self.security.identity_jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            storage: StorageConfig {
                bucket: "avatars".to_string(),
                public_base_url: "http://localhost:54321".to_string(),
                signed_url_ttl_secs: 2 * 60 * 60, // 2 hours
                signing_secret: "dev-storage-secret".to_string(),
            },
            security: SecurityConfig {
                identity_jwt_secret: "dev-identity-secret".to_string(),
                enable_cors: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            storage: StorageConfig {
                bucket: "avatars".to_string(),
                // Real values come from env overrides in production
                public_base_url: String::new(),
                signed_url_ttl_secs: 2 * 60 * 60,
                signing_secret: String::new(),
            },
            security: SecurityConfig {
                identity_jwt_secret: String::new(),
                enable_cors: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.storage.bucket, "avatars");
        assert_eq!(config.storage.signed_url_ttl_secs, 7200);
        assert!(!config.security.identity_jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        // Production refuses to ship baked-in secrets
        assert!(config.security.identity_jwt_secret.is_empty());
        assert!(config.storage.signing_secret.is_empty());
        assert_eq!(config.database.max_connections, 50);
    }
}
