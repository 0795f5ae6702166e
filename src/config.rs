// src/config.rs

use std::env;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Seed credentials for the initial admin account (both must be set).
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Base URL of the external image-upload service. Uploads fail with a
    /// 500 when this is unset; everything else works without it.
    pub media_api_url: Option<String>,
    /// Origin allowed by CORS in addition to localhost dev hosts.
    pub frontend_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let admin_email = env::var("ADMIN_EMAIL").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        let media_api_url = env::var("MEDIA_API_URL").ok();
        let frontend_origin = env::var("FRONTEND_ORIGIN").ok();

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_email,
            admin_password,
            media_api_url,
            frontend_origin,
        }
    }
}
