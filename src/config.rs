use dotenvy::dotenv;
use std::env;

// ============================================================================
// Application Configuration
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for '{0}': {1}")]
    InvalidVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string. When absent the demo falls back to the
    /// in-memory backend.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok(); // Load .env file if present

        let database_url = env::var("DATABASE_URL").ok();
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidVar("DB_MAX_CONNECTIONS", e.to_string()))?;

        tracing::info!(
            database_configured = database_url.is_some(),
            db_max_connections,
            "Configuration loaded"
        );

        Ok(Self {
            database_url,
            db_max_connections,
        })
    }
}
