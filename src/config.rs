use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,

    // Database configuration
    pub database_url: String,
    pub database_namespace: String,
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,

    // Session configuration
    pub jwt_secret: String,
    pub session_ttl_days: i64,

    // External asset host
    pub asset_service_url: String,
    pub asset_service_key: String,

    // Content settings
    pub default_posts_per_page: usize,
    pub max_tags_per_post: usize,

    // Rate limiting (0 disables the limiter)
    pub rate_limit_requests: u32,

    // CORS configuration
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "localhost:8000".to_string()),
            database_namespace: env::var("DATABASE_NAMESPACE")
                .unwrap_or_else(|_| "bantr".to_string()),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "app".to_string()),
            database_username: env::var("DATABASE_USERNAME")
                .unwrap_or_else(|_| "root".to_string()),
            database_password: env::var("DATABASE_PASSWORD")
                .unwrap_or_else(|_| "root".to_string()),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            session_ttl_days: env::var("SESSION_TTL_DAYS")
                .unwrap_or_else(|_| "6".to_string())
                .parse()?,

            asset_service_url: env::var("ASSET_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            asset_service_key: env::var("ASSET_SERVICE_KEY").unwrap_or_default(),

            default_posts_per_page: env::var("DEFAULT_POSTS_PER_PAGE")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            max_tags_per_post: env::var("MAX_TAGS_PER_POST")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,

            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
