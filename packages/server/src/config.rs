use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    /// Base URL of the hosted auth project, e.g. `https://xyz.example.co`
    pub auth_url: String,
    pub auth_anon_key: String,
    /// Project JWT secret. When unset, sessions are validated remotely.
    pub auth_jwt_secret: Option<String>,
    pub site_url: String,
    pub allowed_origins: Vec<String>,
    pub secure_cookies: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            auth_url: var("AUTH_URL").context("AUTH_URL must be set")?,
            auth_anon_key: var("AUTH_ANON_KEY").context("AUTH_ANON_KEY must be set")?,
            auth_jwt_secret: var("AUTH_JWT_SECRET"),
            site_url: var("SITE_URL").unwrap_or_else(|| "http://localhost:8080".to_string()),
            allowed_origins: var("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            secure_cookies: var("SECURE_COOKIES")
                .unwrap_or_else(|| "false".to_string())
                .parse::<bool>()
                .context("SECURE_COOKIES must be true or false")?,
        })
    }
}
